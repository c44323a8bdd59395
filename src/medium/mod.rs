mod base;
mod homogeneous;

pub use base::*;
pub use homogeneous::*;

use crate::core::{
    color::Color,
    loader::InputParams,
    volume::{MediumState, VolumeScatterEvent},
};

/// Outcome of free-path sampling along a segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DistanceSample {
    /// A real collision happened at `event.t < event.max_t`.
    Collision,
    /// The segment was crossed without a collision; `event.throughput` carries the
    /// transmittance estimate for `event.t == event.max_t`.
    Transmitted,
    /// The path spent its volumetric bounce budget; nothing was sampled.
    BounceLimit,
}

/// Volumetric light transport through a participating medium.
///
/// Within one path the calls go `sample_distance`, then on a collision `absorb`, then, if
/// the path survived, `scatter`.
#[enum_dispatch::enum_dispatch(Medium)]
pub trait MediumT: Send + Sync {
    fn is_homogeneous(&self) -> bool;

    fn sample_distance(
        &self,
        event: &mut VolumeScatterEvent<'_>,
        state: &mut MediumState,
    ) -> DistanceSample;

    /// return true when the path is absorbed at the current collision
    fn absorb(&self, event: &mut VolumeScatterEvent<'_>, state: &mut MediumState) -> bool;

    /// return sampled world space direction, also stored in `event.wo`
    fn scatter(&self, event: &mut VolumeScatterEvent<'_>) -> glam::Vec3A;

    fn transmittance(&self, event: &VolumeScatterEvent<'_>) -> Color;

    fn emission(&self, event: &VolumeScatterEvent<'_>) -> Color;

    fn phase_eval(&self, event: &VolumeScatterEvent<'_>) -> Color;

    fn to_json(&self) -> serde_json::Value;
}

#[enum_dispatch::enum_dispatch]
#[derive(Clone, Debug, PartialEq)]
pub enum Medium {
    HomogeneousMedium,
}

pub fn create_medium_from_params(params: &mut InputParams) -> anyhow::Result<Medium> {
    params.set_name("medium".into());
    let ty = params.get_str("type")?;
    let name = params.get_str_or("name", "unnamed")?;
    params.set_name(format!("medium-{}-{}", ty, name).into());

    let res = match ty.as_str() {
        "homogeneous" => HomogeneousMedium::load(params)?.into(),
        _ => anyhow::bail!(format!("{}: unknown type '{}'", params.name(), ty)),
    };

    params.check_unused_keys();

    Ok(res)
}
