use super::{util, PhaseFunctionT};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rayleigh;

impl PhaseFunctionT for Rayleigh {
    fn eval(&self, cos_theta: f32) -> f32 {
        3.0 / 16.0 * std::f32::consts::FRAC_1_PI * (1.0 + cos_theta * cos_theta)
    }

    fn sample(&self, (rand_x, rand_y): (f32, f32)) -> glam::Vec3A {
        // closed-form root of cos^3 + 3 cos + 4 - 8 u = 0
        let z = rand_x * 4.0 - 2.0;
        let root = (z * z + 1.0).sqrt();
        let u = (z + root).cbrt();
        let cos_theta = (u - 1.0 / u).clamp(-1.0, 1.0);
        let phi = 2.0 * std::f32::consts::PI * rand_y;
        util::spherical_direction(cos_theta, phi)
    }

    fn name(&self) -> &'static str {
        "rayleigh"
    }

    fn g(&self) -> f32 {
        0.0
    }
}
