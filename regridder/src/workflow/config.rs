use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use fusecore::moments::band::BandDescriptor;
use serde::{Deserialize, Serialize};

fn default_time_step() -> f64 {
    4.0
}

fn default_range_start() -> f64 {
    0.0
}

fn default_range_end() -> f64 {
    12_000.0
}

fn default_range_step() -> f64 {
    36.0
}

/// Per-band entry of the run configuration; `to_descriptor` turns it into
/// the core descriptor once the band label is known.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BandConfig {
    pub variables: Vec<String>,
    pub log_convert: Vec<String>,
    pub range_offset: f64,
    pub time_tolerance: f64,
    pub range_tolerance: f64,
    pub epoch: String,
    pub file_ext: String,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl BandConfig {
    pub fn to_descriptor(&self, label: &str) -> BandDescriptor {
        BandDescriptor {
            label: label.to_string(),
            variables: self.variables.clone(),
            log_convert: self.log_convert.clone(),
            range_offset: self.range_offset,
            time_tolerance: self.time_tolerance,
            range_tolerance: self.range_tolerance,
            epoch: self.epoch.clone(),
            file_ext: self.file_ext.clone(),
            aliases: self.aliases.clone(),
        }
    }
}

/// Full run configuration: shared reference-grid parameters plus the band
/// table. The built-in defaults describe the X-, Ka-, and W-band radars of
/// the fusion setup; a YAML file replaces them wholesale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    #[serde(default = "default_range_start")]
    pub range_start: f64,
    #[serde(default = "default_range_end")]
    pub range_end: f64,
    #[serde(default = "default_range_step")]
    pub range_step: f64,
    #[serde(default = "default_bands")]
    pub bands: BTreeMap<String, BandConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            range_start: default_range_start(),
            range_end: default_range_end(),
            range_step: default_range_step(),
            bands: default_bands(),
        }
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading run config {}", path_ref.display()))?;
        let config: RunConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing run config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn band(&self, name: &str) -> anyhow::Result<&BandConfig> {
        self.bands
            .get(name)
            .with_context(|| format!("band {} not configured", name))
    }
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn default_bands() -> BTreeMap<String, BandConfig> {
    let mut bands = BTreeMap::new();

    bands.insert(
        "x".to_string(),
        BandConfig {
            variables: strings(&["Zg", "RMSg", "VELg", "SKWg"]),
            log_convert: strings(&["Zg"]),
            range_offset: 0.32,
            time_tolerance: 2.0,
            range_tolerance: 18.0,
            epoch: "1970-01-01 00:00:00 UTC".to_string(),
            file_ext: "znc".to_string(),
            aliases: BTreeMap::new(),
        },
    );

    bands.insert(
        "ka".to_string(),
        BandConfig {
            variables: strings(&["Zg", "RMSg", "VELg", "LDRg", "SKWg"]),
            log_convert: strings(&["Zg", "LDRg"]),
            range_offset: 2.2,
            time_tolerance: 2.0,
            range_tolerance: 18.0,
            epoch: "1970-01-01 00:00:00 UTC".to_string(),
            file_ext: "znc".to_string(),
            aliases: BTreeMap::new(),
        },
    );

    // The W-band software persists `ze`/`vm`/`sw`; its mounting height is
    // the common reference, hence the zero offset.
    let mut w_aliases = BTreeMap::new();
    w_aliases.insert("ze".to_string(), "Zg".to_string());
    w_aliases.insert("vm".to_string(), "VELg".to_string());
    w_aliases.insert("sw".to_string(), "RMSg".to_string());
    bands.insert(
        "w".to_string(),
        BandConfig {
            variables: strings(&["Zg", "RMSg", "VELg"]),
            log_convert: strings(&["Zg"]),
            range_offset: 0.0,
            time_tolerance: 2.0,
            range_tolerance: 18.0,
            epoch: "2001-01-01 00:00:00".to_string(),
            file_ext: "nc".to_string(),
            aliases: w_aliases,
        },
    );

    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_describe_the_three_bands() {
        let config = RunConfig::default();
        assert_eq!(config.time_step, 4.0);
        assert_eq!(config.range_step, 36.0);

        let ka = config.band("ka").unwrap();
        assert!(ka.variables.contains(&"LDRg".to_string()));
        assert_eq!(ka.range_offset, 2.2);
        assert_eq!(ka.log_convert, vec!["Zg", "LDRg"]);

        let x = config.band("x").unwrap();
        assert_eq!(x.range_offset, 0.32);
        assert!(!x.variables.contains(&"LDRg".to_string()));

        let w = config.band("w").unwrap();
        assert_eq!(w.range_offset, 0.0);
        assert_eq!(w.aliases.get("ze").map(String::as_str), Some("Zg"));
    }

    #[test]
    fn unknown_band_is_an_error() {
        let config = RunConfig::default();
        assert!(config.band("s").is_err());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"time_step: 2.0\nbands:\n  ka:\n    variables: [Zg]\n    log_convert: [Zg]\n    range_offset: 2.2\n    time_tolerance: 1.0\n    range_tolerance: 18.0\n    epoch: \"1970-01-01 00:00:00 UTC\"\n    file_ext: znc\n",
        )
        .unwrap();
        let path = temp.into_temp_path();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.time_step, 2.0);
        // Grid fields not present fall back to the defaults.
        assert_eq!(config.range_end, 12_000.0);
        assert_eq!(config.band("ka").unwrap().time_tolerance, 1.0);
        assert!(config.band("x").is_err());
    }

    #[test]
    fn band_config_converts_to_descriptor() {
        let config = RunConfig::default();
        let descriptor = config.band("w").unwrap().to_descriptor("W");
        assert_eq!(descriptor.label, "W");
        assert_eq!(descriptor.source_name("Zg"), "ze");
    }
}
