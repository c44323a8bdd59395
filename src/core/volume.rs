use crate::core::{color::Color, sampler::Sampler};

/// Per-interaction record shared between the integrator and a medium.
///
/// `throughput` holds the weight produced by the latest medium call. The integrator resets it
/// to white before `sample_distance`, folds it into the path after that call, and folds it
/// again after the `absorb` + `scatter` pair.
pub struct VolumeScatterEvent<'a> {
    /// Drives distance and direction sampling.
    pub sampler: &'a mut dyn Sampler,
    /// Only used to pick a spectral channel.
    pub supplemental_sampler: &'a mut dyn Sampler,
    /// Propagation direction of the incoming ray.
    pub wi: glam::Vec3A,
    pub wo: glam::Vec3A,
    pub t: f32,
    pub max_t: f32,
    pub throughput: Color,
    pub pdf: f32,
}

impl<'a> VolumeScatterEvent<'a> {
    pub fn new(
        sampler: &'a mut dyn Sampler,
        supplemental_sampler: &'a mut dyn Sampler,
        wi: glam::Vec3A,
        max_t: f32,
    ) -> Self {
        Self {
            sampler,
            supplemental_sampler,
            wi,
            wo: wi,
            t: max_t,
            max_t,
            throughput: Color::WHITE,
            pdf: 1.0,
        }
    }
}

/// Per-path medium bookkeeping, kept by the integrator across medium interactions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MediumState {
    /// Distance samples taken so far on this path.
    pub bounce: u32,
}

impl MediumState {
    pub fn new() -> Self {
        Self { bounce: 0 }
    }

    pub fn advance(&mut self) {
        self.bounce += 1;
    }
}

impl Default for MediumState {
    fn default() -> Self {
        Self::new()
    }
}
