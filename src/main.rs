use std::path::PathBuf;

use anyhow::*;
use simple_medium::{loader, medium::MediumT};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(
    name = "simple-medium",
    about = "Probe a homogeneous participating medium with Monte Carlo slab transport"
)]
struct Opt {
    /// Probe description (JSON with 'medium' and 'probe' objects)
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Override the number of paths
    #[structopt(long)]
    samples: Option<u64>,

    /// Override the number of worker threads
    #[structopt(long)]
    threads: Option<u32>,

    /// Seed for reproducible runs
    #[structopt(long)]
    seed: Option<u64>,

    /// Print the medium as JSON before probing
    #[structopt(long)]
    dump: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::from_args();

    log::info!("Loading '{}'...", opt.input.display());
    let (medium, mut probe) = loader::load_probe(&opt.input)?;

    if opt.dump {
        println!("{}", serde_json::to_string_pretty(&medium.to_json())?);
    }

    if let Some(samples) = opt.samples {
        if samples == 0 {
            bail!("--samples should be positive");
        }
        probe = probe.with_samples(samples);
    }
    if let Some(threads) = opt.threads {
        probe = probe.with_threads(threads);
    }
    if opt.seed.is_some() {
        probe = probe.with_seed(opt.seed);
    }
    let probe = probe.with_progress(true);

    let begin_time = std::time::SystemTime::now();
    let report = probe.run(&medium)?;
    let duration = std::time::SystemTime::now().duration_since(begin_time)?;

    report.log();
    log::info!("Finished, time used: {:?}", duration);
    Ok(())
}
