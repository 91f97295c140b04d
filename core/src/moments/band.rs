use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declarative per-instrument descriptor selected once at configuration time.
///
/// Everything band-specific lives here: which variables to extract, which of
/// them are reflectivity-like and get converted to dB, the mounting-height
/// range offset, the matching tolerances, and the epoch the instrument's
/// timestamps count from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandDescriptor {
    /// Display name used in output paths, e.g. "X", "Ka", "W".
    pub label: String,
    /// Canonical variable names extracted from every file of the day.
    pub variables: Vec<String>,
    /// Subset of `variables` converted to dB after resampling.
    pub log_convert: Vec<String>,
    /// Added to the range coordinate before resampling. The W-band mounting
    /// height is the common reference, so its offset is zero.
    pub range_offset: f64,
    /// Maximum time distance (seconds) for a nearest-neighbor match.
    pub time_tolerance: f64,
    /// Maximum range distance (meters) for a nearest-neighbor match.
    pub range_tolerance: f64,
    /// Reference instant the instrument's raw timestamps count from,
    /// e.g. "1970-01-01 00:00:00 UTC".
    pub epoch: String,
    /// Extension of the instrument's daily files.
    pub file_ext: String,
    /// Source-file variable name -> canonical name. Lets instruments that
    /// persist `ze`/`vm`/`sw` feed the canonical `Zg`/`VELg`/`RMSg` set.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl BandDescriptor {
    /// Resolves the source-file name carrying the canonical variable `name`.
    pub fn source_name<'a>(&'a self, name: &'a str) -> &'a str {
        for (source, canonical) in &self.aliases {
            if canonical == name {
                return source;
            }
        }
        name
    }

    pub fn converts_to_db(&self, name: &str) -> bool {
        self.log_convert.iter().any(|candidate| candidate == name)
    }
}
