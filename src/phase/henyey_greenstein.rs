use super::{util, PhaseFunctionT};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HenyeyGreenstein {
    g: f32,
}

impl HenyeyGreenstein {
    /// Below this `|g|` sampling falls back to the isotropic mapping.
    const ISOTROPIC_EPS: f32 = 1e-3;

    pub fn new(g: f32) -> Self {
        Self { g }
    }
}

impl PhaseFunctionT for HenyeyGreenstein {
    fn eval(&self, cos_theta: f32) -> f32 {
        let g = self.g;
        let g2 = g * g;
        let denom = 1.0 + g2 - 2.0 * g * cos_theta;
        let denom = denom * denom.sqrt();
        util::INV_FOUR_PI * (1.0 - g2) / denom
    }

    fn sample(&self, (rand_x, rand_y): (f32, f32)) -> glam::Vec3A {
        let cos_theta = if self.g.abs() < Self::ISOTROPIC_EPS {
            1.0 - 2.0 * rand_x
        } else {
            let g = self.g;
            let g2 = g * g;
            let temp = (1.0 - g2) / (1.0 - g + 2.0 * g * rand_x);
            (0.5 * (1.0 + g2 - temp * temp) / g).clamp(-1.0, 1.0)
        };
        let phi = 2.0 * std::f32::consts::PI * rand_y;
        util::spherical_direction(cos_theta, phi)
    }

    fn name(&self) -> &'static str {
        "henyey_greenstein"
    }

    fn g(&self) -> f32 {
        self.g
    }
}
