use crate::{
    core::{
        color::{Color, CHANNELS},
        coord::Coordinate,
        loader::InputParams,
        volume::{MediumState, VolumeScatterEvent},
    },
    phase::PhaseFunctionT,
};

use super::{DistanceSample, MediumBase, MediumT};

/// Medium with constant absorption and scattering coefficients.
///
/// Derived coefficients are computed on construction and the value is immutable afterwards,
/// so a configured medium can be shared by reference across render threads.
#[derive(Clone, Debug, PartialEq)]
pub struct HomogeneousMedium {
    base: MediumBase,
    sigma_a: Color,
    sigma_s: Color,
    sigma_t: Color,
    albedo: Color,
    max_albedo: f32,
    absorption_weight: f32,
    absorption_only: bool,
}

impl HomogeneousMedium {
    pub fn new(sigma_a: Color, sigma_s: Color, base: MediumBase) -> Self {
        let sigma_t = sigma_a + sigma_s;
        let albedo = sigma_s.safe_div(sigma_t);
        let max_albedo = albedo.max_element();
        Self {
            base,
            sigma_a,
            sigma_s,
            sigma_t,
            albedo,
            max_albedo,
            absorption_weight: 1.0 / max_albedo,
            absorption_only: max_albedo == 0.0,
        }
    }

    /// Same medium settings with new coefficients.
    pub fn with_coefficients(&self, sigma_a: Color, sigma_s: Color) -> Self {
        Self::new(sigma_a, sigma_s, self.base)
    }

    pub fn load(params: &mut InputParams) -> anyhow::Result<Self> {
        let base = MediumBase::load(params)?;
        let sigma_a = params.get_color_or("sigma_a", Color::BLACK)?;
        let sigma_s = params.get_color_or("sigma_s", Color::BLACK)?;
        for (key, sigma) in [("sigma_a", sigma_a), ("sigma_s", sigma_s)] {
            if !sigma.is_finite() || sigma.min_element() < 0.0 {
                anyhow::bail!(format!(
                    "{} - '{}' should be finite and non-negative",
                    params.name(),
                    key
                ));
            }
        }

        let medium = Self::new(sigma_a, sigma_s, base);
        if medium.absorption_only {
            log::debug!("{} - no scattering, distances are not sampled", params.name());
        }
        Ok(medium)
    }

    pub fn base(&self) -> &MediumBase {
        &self.base
    }

    pub fn sigma_a(&self) -> Color {
        self.sigma_a
    }

    pub fn sigma_s(&self) -> Color {
        self.sigma_s
    }

    pub fn sigma_t(&self) -> Color {
        self.sigma_t
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn max_albedo(&self) -> f32 {
        self.max_albedo
    }

    pub fn absorption_weight(&self) -> f32 {
        self.absorption_weight
    }

    pub fn absorption_only(&self) -> bool {
        self.absorption_only
    }
}

impl MediumT for HomogeneousMedium {
    fn is_homogeneous(&self) -> bool {
        true
    }

    fn sample_distance(
        &self,
        event: &mut VolumeScatterEvent<'_>,
        state: &mut MediumState,
    ) -> DistanceSample {
        if state.bounce > self.base.max_bounce {
            return DistanceSample::BounceLimit;
        }

        if self.absorption_only {
            event.t = event.max_t;
            event.throughput *= beer_lambert(self.sigma_t, event.t);
            return DistanceSample::Transmitted;
        }

        // one-sample MIS over the spectral channels
        let channel = (event.supplemental_sampler.uniform_u32() % CHANNELS as u32) as usize;
        let sigma_tc = self.sigma_t[channel];
        let rand = event.sampler.uniform_1d();
        let t = if sigma_tc > 0.0 {
            -(1.0 - rand).ln() / sigma_tc
        } else {
            f32::INFINITY
        };

        event.t = t.min(event.max_t);
        let tr = beer_lambert(self.sigma_t, event.t);
        let collided = t < event.max_t;
        let density = if collided { self.sigma_t * tr } else { tr };
        let mut pdf = density.avg();
        if pdf == 0.0 {
            debug_assert!(tr.is_black());
            pdf = 1.0;
        }
        event.throughput *= tr / pdf;

        state.advance();

        if collided {
            DistanceSample::Collision
        } else {
            DistanceSample::Transmitted
        }
    }

    fn absorb(&self, event: &mut VolumeScatterEvent<'_>, _state: &mut MediumState) -> bool {
        if event.sampler.uniform_1d() >= self.max_albedo {
            return true;
        }
        event.throughput = Color::gray(self.absorption_weight);
        false
    }

    fn scatter(&self, event: &mut VolumeScatterEvent<'_>) -> glam::Vec3A {
        let phase = &self.base.phase_function;
        let wo_local = phase.sample(event.sampler.uniform_2d());
        event.pdf = phase.eval(wo_local.z);
        event.throughput *= self.sigma_s;
        event.wo = Coordinate::from_z(event.wi).to_world(wo_local);
        event.wo
    }

    fn transmittance(&self, event: &VolumeScatterEvent<'_>) -> Color {
        beer_lambert(self.sigma_t, event.t)
    }

    fn emission(&self, _event: &VolumeScatterEvent<'_>) -> Color {
        Color::BLACK
    }

    fn phase_eval(&self, event: &VolumeScatterEvent<'_>) -> Color {
        self.sigma_s * self.base.phase_function.eval(event.wi.dot(event.wo))
    }

    fn to_json(&self) -> serde_json::Value {
        let mut value = self.base.to_json();
        value["type"] = "homogeneous".into();
        value["sigma_a"] = color_to_json(self.sigma_a);
        value["sigma_s"] = color_to_json(self.sigma_s);
        value
    }
}

/// `exp(-sigma_t * dist)` per channel; a channel without extinction stays 1 even for an
/// infinite distance.
fn beer_lambert(sigma_t: Color, dist: f32) -> Color {
    sigma_t.map(|sigma| if sigma == 0.0 { 1.0 } else { (-sigma * dist).exp() })
}

fn color_to_json(color: Color) -> serde_json::Value {
    serde_json::json!([color.r, color.g, color.b])
}
