/// Source of uniform variates for the medium model.
///
/// The scatter event carries two independent samplers: the primary one drives distance and
/// direction sampling, the supplemental one only picks spectral channels.
pub trait Sampler {
    /// Uniform variate in `[0, 1)`.
    fn uniform_1d(&mut self) -> f32;

    fn uniform_2d(&mut self) -> (f32, f32) {
        (self.uniform_1d(), self.uniform_1d())
    }

    /// Uniform integer, used modulo a small count for discrete choices.
    fn uniform_u32(&mut self) -> u32;
}

/// Replays fixed variates, cycling when exhausted.
#[cfg(test)]
pub struct SequenceSampler {
    floats: Vec<f32>,
    ints: Vec<u32>,
    float_index: usize,
    int_index: usize,
}

#[cfg(test)]
impl SequenceSampler {
    pub fn new(floats: &[f32], ints: &[u32]) -> Self {
        Self {
            floats: if floats.is_empty() { vec![0.5] } else { floats.to_vec() },
            ints: if ints.is_empty() { vec![0] } else { ints.to_vec() },
            float_index: 0,
            int_index: 0,
        }
    }
}

#[cfg(test)]
impl Sampler for SequenceSampler {
    fn uniform_1d(&mut self) -> f32 {
        let value = self.floats[self.float_index % self.floats.len()];
        self.float_index += 1;
        value
    }

    fn uniform_u32(&mut self) -> u32 {
        let value = self.ints[self.int_index % self.ints.len()];
        self.int_index += 1;
        value
    }
}
