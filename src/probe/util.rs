#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SampleRange {
    pub from: u64,
    pub to: u64,
}

impl SampleRange {
    pub fn len(&self) -> u64 {
        self.to - self.from
    }
}

pub fn create_sample_ranges(num_thread: u32, samples: u64) -> Vec<SampleRange> {
    let samples_per_thread = samples / num_thread as u64;
    let mut ranges = Vec::with_capacity(num_thread as usize);
    for t in 0..num_thread as u64 {
        let from = t * samples_per_thread;
        let to = if t + 1 == num_thread as u64 {
            samples
        } else {
            (t + 1) * samples_per_thread
        };
        ranges.push(SampleRange { from, to });
    }
    ranges
}

pub fn probe_progress_bar(samples: u64, visible: bool) -> indicatif::ProgressBar {
    if !visible {
        return indicatif::ProgressBar::hidden();
    }
    let progress_bar = indicatif::ProgressBar::new(samples);
    progress_bar.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (eta: {eta})")
            .progress_chars("#>-"),
    );
    progress_bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_cover_all_samples() {
        let ranges = create_sample_ranges(3, 10);
        assert_eq!(
            ranges,
            vec![
                SampleRange { from: 0, to: 3 },
                SampleRange { from: 3, to: 6 },
                SampleRange { from: 6, to: 10 },
            ]
        );
        assert_eq!(ranges.iter().map(SampleRange::len).sum::<u64>(), 10);
    }

    #[test]
    fn more_threads_than_samples() {
        let ranges = create_sample_ranges(4, 2);
        assert_eq!(ranges.iter().map(SampleRange::len).sum::<u64>(), 2);
        assert_eq!(ranges.last().unwrap().to, 2);
    }
}
