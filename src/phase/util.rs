pub const INV_FOUR_PI: f32 = 0.25 * std::f32::consts::FRAC_1_PI;

/// Unit vector around the local `z` axis.
pub fn spherical_direction(cos_theta: f32, phi: f32) -> glam::Vec3A {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (sin_phi, cos_phi) = phi.sin_cos();
    glam::Vec3A::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
}
