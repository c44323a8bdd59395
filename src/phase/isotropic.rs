use super::{util, PhaseFunctionT};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Isotropic;

impl PhaseFunctionT for Isotropic {
    fn eval(&self, _cos_theta: f32) -> f32 {
        util::INV_FOUR_PI
    }

    fn sample(&self, (rand_x, rand_y): (f32, f32)) -> glam::Vec3A {
        let cos_theta = 1.0 - 2.0 * rand_x;
        let phi = 2.0 * std::f32::consts::PI * rand_y;
        util::spherical_direction(cos_theta, phi)
    }

    fn name(&self) -> &'static str {
        "isotropic"
    }

    fn g(&self) -> f32 {
        0.0
    }
}
