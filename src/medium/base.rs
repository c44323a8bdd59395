use crate::{
    core::loader::InputParams,
    phase::{self, PhaseFunction, PhaseFunctionT},
};

/// Settings every medium variant shares.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MediumBase {
    pub phase_function: PhaseFunction,
    /// Paths may scatter while their bounce count is at most this value.
    pub max_bounce: u32,
}

impl MediumBase {
    pub const DEFAULT_MAX_BOUNCE: u32 = 1024;

    pub fn new(phase_function: PhaseFunction, max_bounce: u32) -> Self {
        Self {
            phase_function,
            max_bounce,
        }
    }

    pub fn load(params: &mut InputParams) -> anyhow::Result<Self> {
        let phase_function = phase::create_phase_function_from_params(params)?;
        let max_bounce = params.get_uint_or("max_bounces", Self::DEFAULT_MAX_BOUNCE)?;
        Ok(Self::new(phase_function, max_bounce))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "phase_function": self.phase_function.name(),
            "phase_g": self.phase_function.g(),
            "max_bounces": self.max_bounce,
        })
    }
}

impl Default for MediumBase {
    fn default() -> Self {
        Self::new(PhaseFunction::default(), Self::DEFAULT_MAX_BOUNCE)
    }
}
