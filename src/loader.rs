use std::path::Path;

use crate::{
    core::loader::InputParams,
    medium::{self, Medium},
    probe::SlabProbe,
};

/// Reads a probe description: a `medium` object and a `probe` object.
pub fn load_probe<P: AsRef<Path>>(path: P) -> anyhow::Result<(Medium, SlabProbe)> {
    let mut params = InputParams::from_file(&path)?;
    params.set_name(path.as_ref().display().to_string().into());
    load_probe_from_params(&mut params)
}

pub fn load_probe_from_params(params: &mut InputParams) -> anyhow::Result<(Medium, SlabProbe)> {
    let mut medium_params = params.take_object("medium")?;
    let medium = medium::create_medium_from_params(&mut medium_params)?;

    let mut probe_params = params.take_object("probe")?;
    let probe = SlabProbe::load(&mut probe_params)?;
    probe_params.check_unused_keys();

    params.check_unused_keys();

    Ok((medium, probe))
}
