mod henyey_greenstein;
mod isotropic;
mod rayleigh;
mod util;

pub use henyey_greenstein::*;
pub use isotropic::*;
pub use rayleigh::*;

use crate::core::loader::InputParams;

/// Angular scattering distribution in a local frame whose `z` axis is the propagation
/// direction of the incoming light, so `cos_theta = wi · wo` and positive `g` scatters forward.
#[enum_dispatch::enum_dispatch(PhaseFunction)]
pub trait PhaseFunctionT: Send + Sync {
    /// Density (per steradian) of scattering by angle `acos(cos_theta)`.
    fn eval(&self, cos_theta: f32) -> f32;

    /// Local direction distributed proportionally to `eval`.
    fn sample(&self, u: (f32, f32)) -> glam::Vec3A;

    fn name(&self) -> &'static str;

    fn g(&self) -> f32;
}

#[enum_dispatch::enum_dispatch]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PhaseFunction {
    Isotropic,
    HenyeyGreenstein,
    Rayleigh,
}

impl Default for PhaseFunction {
    fn default() -> Self {
        Isotropic.into()
    }
}

pub fn create_phase_function(name: &str, g: f32) -> anyhow::Result<PhaseFunction> {
    let res = match name {
        "isotropic" => Isotropic.into(),
        "henyey_greenstein" => {
            if !(g.abs() < 1.0) {
                anyhow::bail!(format!(
                    "henyey_greenstein: 'phase_g' should be in (-1, 1), got {}",
                    g
                ));
            }
            HenyeyGreenstein::new(g).into()
        }
        "rayleigh" => Rayleigh.into(),
        _ => anyhow::bail!(format!("unknown phase function '{}'", name)),
    };
    Ok(res)
}

/// Reads `phase_function` and `phase_g`, defaulting to an isotropic phase function.
pub fn create_phase_function_from_params(
    params: &mut InputParams,
) -> anyhow::Result<PhaseFunction> {
    let name = params.get_str_or("phase_function", "isotropic")?;
    let g = params.get_float_or("phase_g", 0.0)?;
    create_phase_function(&name, g).map_err(|err| anyhow::anyhow!("{} - {}", params.name(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Rng;

    fn all_phase_functions() -> Vec<PhaseFunction> {
        vec![
            Isotropic.into(),
            HenyeyGreenstein::new(0.0).into(),
            HenyeyGreenstein::new(0.7).into(),
            HenyeyGreenstein::new(-0.4).into(),
            Rayleigh.into(),
        ]
    }

    /// Integral of `eval` over the sphere for `cos_theta` in `[from, to]`.
    fn integrate(phase: &PhaseFunction, from: f32, to: f32) -> f32 {
        let steps = 20000;
        let dc = (to - from) / steps as f32;
        (0..steps)
            .map(|i| {
                let cos = from + (i as f32 + 0.5) * dc;
                2.0 * std::f32::consts::PI * phase.eval(cos) * dc
            })
            .sum()
    }

    #[test]
    fn densities_are_normalized() {
        for phase in all_phase_functions() {
            let total = integrate(&phase, -1.0, 1.0);
            assert!((total - 1.0).abs() < 1e-3, "{:?} integrates to {}", phase, total);
        }
    }

    #[test]
    fn samples_are_unit_vectors() {
        let mut rng = Rng::with_seed(3);
        for phase in all_phase_functions() {
            for _ in 0..1000 {
                let w = phase.sample(rng.uniform_2d());
                assert!((w.length() - 1.0).abs() < 1e-4);
            }
            for u in [(0.0, 0.0), (1.0, 1.0), (0.5, 0.25)] {
                let w = phase.sample(u);
                assert!((w.length() - 1.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn sampling_follows_density() {
        let mut rng = Rng::with_seed(11);
        let n = 200000;
        for phase in all_phase_functions() {
            let mut forward = 0;
            let mut mean_cos = 0.0;
            for _ in 0..n {
                let w = phase.sample(rng.uniform_2d());
                if w.z > 0.0 {
                    forward += 1;
                }
                mean_cos += w.z as f64;
            }
            let forward = forward as f32 / n as f32;
            let mean_cos = (mean_cos / n as f64) as f32;
            let expected = integrate(&phase, 0.0, 1.0);
            assert!(
                (forward - expected).abs() < 0.01,
                "{:?}: forward fraction {} vs {}",
                phase,
                forward,
                expected
            );
            assert!(
                (mean_cos - phase.g()).abs() < 0.01,
                "{:?}: mean cosine {}",
                phase,
                mean_cos
            );
        }
    }

    #[test]
    fn factory_by_name() {
        assert_eq!(
            create_phase_function("henyey_greenstein", 0.5).unwrap(),
            PhaseFunction::from(HenyeyGreenstein::new(0.5))
        );
        assert_eq!(
            create_phase_function("rayleigh", 0.0).unwrap(),
            PhaseFunction::from(Rayleigh)
        );
        assert!(create_phase_function("henyey_greenstein", 1.0).is_err());
        assert!(create_phase_function("mie", 0.0).is_err());
    }
}
