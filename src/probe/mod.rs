mod util;

use std::ops::AddAssign;

use crate::{
    core::{
        color::Color,
        loader::InputParams,
        rng::Rng,
        sampler::Sampler,
        volume::{MediumState, VolumeScatterEvent},
    },
    medium::{DistanceSample, Medium, MediumT},
};

/// Monte Carlo transport through an infinite slab `0 <= z <= thickness` filled with a medium,
/// lit by a collimated beam entering at `z = 0` along `+z`.
///
/// Drives a medium the way a volumetric path tracer does, so its estimates can be checked
/// against closed forms.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlabProbe {
    thickness: f32,
    samples: u64,
    seed: Option<u64>,
    threads: u32,
    show_progress: bool,
}

/// Accumulated path tallies of one worker.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct ProbeTally {
    reflected: Color,
    transmitted: Color,
    detector: Color,
    emitted: Color,
    bounces: u64,
    absorbed: u64,
    bounce_limited: u64,
    escaped: u64,
}

impl AddAssign for ProbeTally {
    fn add_assign(&mut self, rhs: Self) {
        self.reflected += rhs.reflected;
        self.transmitted += rhs.transmitted;
        self.detector += rhs.detector;
        self.emitted += rhs.emitted;
        self.bounces += rhs.bounces;
        self.absorbed += rhs.absorbed;
        self.bounce_limited += rhs.bounce_limited;
        self.escaped += rhs.escaped;
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProbeReport {
    pub samples: u64,
    /// Mean weight leaving through `z = 0`.
    pub reflectance: Color,
    /// Mean weight leaving through `z = thickness`, ballistic part included.
    pub transmittance: Color,
    /// Closed-form unscattered transmittance of the slab.
    pub ballistic: Color,
    /// Next-event estimate of radiance scattered out of the back face along `+z`.
    pub detector: Color,
    pub emission: Color,
    pub mean_bounces: f32,
    pub absorbed: u64,
    pub bounce_limited: u64,
    /// Paths that left sideways, parallel to the slab.
    pub escaped: u64,
}

impl SlabProbe {
    /// Paths between two progress bar updates.
    const PROGRESS_CHUNK: u64 = 1024;

    pub fn new(thickness: f32, samples: u64) -> Self {
        Self {
            thickness,
            samples,
            seed: None,
            threads: num_cpus::get() as u32,
            show_progress: false,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_samples(mut self, samples: u64) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn load(params: &mut InputParams) -> anyhow::Result<Self> {
        let thickness = params.get_float("thickness")?;
        if !(thickness > 0.0) || !thickness.is_finite() {
            anyhow::bail!(format!(
                "{} - 'thickness' should be positive and finite",
                params.name()
            ));
        }
        let samples = params.get_ulong("samples")?;
        if samples == 0 {
            anyhow::bail!(format!("{} - 'samples' should be positive", params.name()));
        }

        let mut probe = Self::new(thickness, samples);
        if params.contains_key("seed") {
            probe = probe.with_seed(Some(params.get_ulong("seed")?));
        }
        if params.contains_key("threads") {
            let threads = params.get_uint("threads")?;
            if threads == 0 {
                anyhow::bail!(format!("{} - 'threads' should be positive", params.name()));
            }
            probe = probe.with_threads(threads);
        }
        Ok(probe)
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn threads(&self) -> u32 {
        self.threads
    }

    pub fn run(&self, medium: &Medium) -> anyhow::Result<ProbeReport> {
        log::info!(
            "Probing slab of thickness {} with {} paths on {} threads",
            self.thickness,
            self.samples,
            self.threads
        );

        let progress_bar = util::probe_progress_bar(self.samples, self.show_progress);
        let ranges = util::create_sample_ranges(self.threads, self.samples);

        let tallies = crossbeam::scope(|scope| {
            let handles = ranges
                .iter()
                .enumerate()
                .map(|(t, range)| {
                    let range = *range;
                    let progress_bar = progress_bar.clone();
                    let probe = self;
                    scope.spawn(move |_| {
                        let (mut rng, mut supplemental) = match probe.seed {
                            Some(seed) => (
                                Rng::with_seed(seed.wrapping_add(2 * t as u64)),
                                Rng::with_seed(seed.wrapping_add(2 * t as u64 + 1)),
                            ),
                            None => (Rng::new(), Rng::new()),
                        };
                        let mut tally = ProbeTally::default();
                        let mut done = 0;
                        while done < range.len() {
                            let chunk = Self::PROGRESS_CHUNK.min(range.len() - done);
                            for _ in 0..chunk {
                                probe.trace_path(medium, &mut rng, &mut supplemental, &mut tally);
                            }
                            done += chunk;
                            progress_bar.inc(chunk);
                        }
                        tally
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(|_| anyhow::anyhow!("probe scope panicked"))?
        .map_err(|_| anyhow::anyhow!("probe worker panicked"))?;

        progress_bar.finish_and_clear();

        let mut total = ProbeTally::default();
        for tally in tallies {
            total += tally;
        }

        Ok(self.report(medium, total))
    }

    fn report(&self, medium: &Medium, tally: ProbeTally) -> ProbeReport {
        // transmittance queries never draw from the samplers
        let mut rng = Rng::with_seed(0);
        let mut supplemental = Rng::with_seed(0);
        let event = VolumeScatterEvent::new(
            &mut rng,
            &mut supplemental,
            glam::Vec3A::Z,
            self.thickness,
        );
        let ballistic = medium.transmittance(&event);

        let inv_samples = 1.0 / self.samples.max(1) as f32;
        ProbeReport {
            samples: self.samples,
            reflectance: tally.reflected * inv_samples,
            transmittance: tally.transmitted * inv_samples,
            ballistic,
            detector: tally.detector * inv_samples,
            emission: tally.emitted * inv_samples,
            mean_bounces: tally.bounces as f32 * inv_samples,
            absorbed: tally.absorbed,
            bounce_limited: tally.bounce_limited,
            escaped: tally.escaped,
        }
    }

    fn trace_path(
        &self,
        medium: &Medium,
        sampler: &mut dyn Sampler,
        supplemental_sampler: &mut dyn Sampler,
        tally: &mut ProbeTally,
    ) {
        let mut state = MediumState::new();
        let mut throughput = Color::WHITE;
        let mut z = 0.0_f32;
        let mut dir = glam::Vec3A::Z;

        loop {
            let max_t = if dir.z > 0.0 {
                (self.thickness - z) / dir.z
            } else if dir.z < 0.0 {
                -z / dir.z
            } else {
                f32::INFINITY
            };

            let mut event = VolumeScatterEvent::new(sampler, supplemental_sampler, dir, max_t);
            match medium.sample_distance(&mut event, &mut state) {
                DistanceSample::BounceLimit => {
                    tally.bounce_limited += 1;
                    break;
                }
                DistanceSample::Transmitted => {
                    throughput *= event.throughput;
                    if dir.z > 0.0 {
                        tally.transmitted += throughput;
                    } else if dir.z < 0.0 {
                        tally.reflected += throughput;
                    } else {
                        tally.escaped += 1;
                    }
                    break;
                }
                DistanceSample::Collision => {
                    throughput *= event.throughput;
                    z = (z + dir.z * event.t).clamp(0.0, self.thickness);
                    tally.emitted += throughput * medium.emission(&event);

                    // connect to the detector, reusing the event for the query
                    event.wo = glam::Vec3A::Z;
                    event.t = self.thickness - z;
                    tally.detector +=
                        throughput * medium.phase_eval(&event) * medium.transmittance(&event);

                    event.throughput = Color::WHITE;
                    if medium.absorb(&mut event, &mut state) {
                        tally.absorbed += 1;
                        break;
                    }
                    dir = medium.scatter(&mut event);
                    throughput *= event.throughput;
                }
            }

            if !throughput.is_finite() {
                log::warn!("dropping path with non-finite throughput {:?}", throughput);
                break;
            }
        }

        tally.bounces += state.bounce as u64;
    }
}

impl ProbeReport {
    pub fn log(&self) {
        log::info!("paths: {}", self.samples);
        log::info!("reflectance: {:?}", self.reflectance);
        log::info!("transmittance: {:?}", self.transmittance);
        log::info!("ballistic transmittance: {:?}", self.ballistic);
        log::info!("detector radiance: {:?}", self.detector);
        log::info!("mean bounces: {}", self.mean_bounces);
        log::info!(
            "absorbed: {}, bounce limited: {}, escaped: {}",
            self.absorbed,
            self.bounce_limited,
            self.escaped
        );
        if !self.emission.is_black() {
            log::info!("emission: {:?}", self.emission);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::{HomogeneousMedium, MediumBase};
    use crate::phase::{HenyeyGreenstein, PhaseFunction};

    fn medium(sigma_a: Color, sigma_s: Color, base: MediumBase) -> Medium {
        HomogeneousMedium::new(sigma_a, sigma_s, base).into()
    }

    fn assert_color_close(a: Color, b: Color, eps: f32) {
        assert!(
            (a - b).map(f32::abs).max_element() <= eps,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn vacuum_transmits_everything() {
        let vacuum = medium(Color::BLACK, Color::BLACK, MediumBase::default());
        let probe = SlabProbe::new(2.0, 1000).with_seed(Some(1)).with_threads(2);
        let report = probe.run(&vacuum).unwrap();
        assert_color_close(report.transmittance, Color::WHITE, 1e-6);
        assert_eq!(report.reflectance, Color::BLACK);
        assert_eq!(report.ballistic, Color::WHITE);
        assert_eq!(report.detector, Color::BLACK);
        assert_eq!(report.mean_bounces, 0.0);
        assert_eq!(report.absorbed, 0);
    }

    #[test]
    fn absorber_matches_beer_lambert() {
        let sigma_a = Color::new(0.2, 0.5, 1.0);
        let absorber = medium(sigma_a, Color::BLACK, MediumBase::default());
        let report = SlabProbe::new(1.5, 500)
            .with_seed(Some(2))
            .with_threads(3)
            .run(&absorber)
            .unwrap();
        assert_color_close(report.transmittance, (-sigma_a * 1.5).exp(), 1e-4);
        assert_color_close(report.transmittance, report.ballistic, 1e-4);
        assert_eq!(report.reflectance, Color::BLACK);
    }

    #[test]
    fn conservative_medium_conserves_energy() {
        let phase = PhaseFunction::from(HenyeyGreenstein::new(0.5));
        let white = medium(Color::BLACK, Color::gray(2.0), MediumBase::new(phase, 100000));
        let report = SlabProbe::new(1.0, 20000)
            .with_seed(Some(3))
            .with_threads(4)
            .run(&white)
            .unwrap();
        assert_eq!(report.absorbed, 0);
        assert_eq!(report.bounce_limited, 0);
        assert_color_close(
            report.reflectance + report.transmittance,
            Color::WHITE,
            1e-3,
        );
        assert!(report.reflectance.r > 0.0);
        assert!(report.transmittance.r > report.ballistic.r);
        assert!(report.mean_bounces > 1.0);
    }

    #[test]
    fn ballistic_part_of_transmittance() {
        let sigma_a = Color::new(0.3, 0.3, 0.3);
        let thin = medium(sigma_a, Color::gray(0.3), MediumBase::default());
        let report = SlabProbe::new(0.5, 40000)
            .with_seed(Some(4))
            .with_threads(2)
            .run(&thin)
            .unwrap();
        assert!(report.transmittance.r >= report.ballistic.r - 0.01);
        assert!(report.detector.r > 0.0);
        assert!(report.detector.is_finite());
        assert_eq!(report.emission, Color::BLACK);
    }

    #[test]
    fn bounce_budget_drops_paths() {
        let dense = medium(
            Color::BLACK,
            Color::gray(10.0),
            MediumBase::new(PhaseFunction::default(), 0),
        );
        let report = SlabProbe::new(1.0, 1000)
            .with_seed(Some(5))
            .with_threads(1)
            .run(&dense)
            .unwrap();
        assert!(report.bounce_limited > 0);
        assert!(report.mean_bounces <= 1.0);
    }

    #[test]
    fn seeded_runs_repeat() {
        let fog = medium(
            Color::new(0.1, 0.2, 0.3),
            Color::new(0.9, 0.6, 0.3),
            MediumBase::default(),
        );
        let probe = SlabProbe::new(1.0, 3000).with_seed(Some(6)).with_threads(3);
        assert_eq!(probe.run(&fog).unwrap(), probe.run(&fog).unwrap());
    }

    #[test]
    fn load_validates_fields() {
        use std::convert::TryInto;

        let mut params: InputParams = serde_json::json!({
            "thickness": 2,
            "samples": 100,
            "seed": 7,
            "threads": 2,
        })
        .try_into()
        .unwrap();
        let probe = SlabProbe::load(&mut params).unwrap();
        assert_eq!(probe.thickness(), 2.0);
        assert_eq!(probe.samples(), 100);
        assert_eq!(probe.threads(), 2);

        let mut params: InputParams = serde_json::json!({
            "thickness": 1.0,
            "samples": 4294967297_u64,
            "seed": 4294967296_u64,
        })
        .try_into()
        .unwrap();
        assert_eq!(SlabProbe::load(&mut params).unwrap().samples(), 4294967297);

        for value in [
            serde_json::json!({ "thickness": 0.0, "samples": 10 }),
            serde_json::json!({ "thickness": 1.0, "samples": 0 }),
            serde_json::json!({ "thickness": 1.0, "samples": 10, "threads": 0 }),
            serde_json::json!({ "samples": 10 }),
            serde_json::json!({ "thickness": 1.0, "samples": -5 }),
            serde_json::json!({ "thickness": 1.0, "samples": 10, "seed": -1 }),
            serde_json::json!({ "thickness": 1.0, "samples": 10, "threads": 4294967296_u64 }),
        ] {
            let mut params: InputParams = value.try_into().unwrap();
            assert!(SlabProbe::load(&mut params).is_err());
        }
    }
}
