//! Loading the slot layout from a TOML file

use std::path::Path;

use eyre::{Result, WrapErr};
use parking_slots_core::Config;

/// Read the slots and reservations to launch with
///
/// Without a file, the demo lot is used.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        tracing::info!("no slot file given, using the demo lot");
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading {} failed", path.display()))?;
    parse(&contents).wrap_err_with(|| format!("{} is not a valid slot file", path.display()))
}

fn parse(contents: &str) -> Result<Config> {
    Ok(toml::from_str(contents)?)
}
