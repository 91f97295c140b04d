use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use fusecore::moments::band::BandDescriptor;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::store::reader::{epoch_offset_seconds, MomentDocument, VariableDocument};

/// Shape of a synthesized day of moment files.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub files: usize,
    pub samples_per_file: usize,
    pub range_bins: usize,
    /// Native range resolution of the fake instrument, deliberately off the
    /// reference grid.
    pub range_step: f64,
    pub native_time_step: f64,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            files: 3,
            samples_per_file: 40,
            range_bins: 64,
            range_step: 30.0,
            native_time_step: 3.0,
            seed: 7,
        }
    }
}

fn moment_value(rng: &mut StdRng, name: &str) -> f64 {
    match name {
        // Reflectivity-like moments stay linear here; the pipeline converts.
        "Zg" | "LDRg" => rng.gen_range(0.5..500.0),
        "VELg" => rng.gen_range(-3.0..1.0),
        "RMSg" => rng.gen_range(0.05..1.5),
        _ => rng.gen_range(-1.0..1.0),
    }
}

/// Writes a day of plausible moment files under the archive convention, for
/// smoke runs and tests. Timestamps carry jitter and the range axis uses the
/// instrument's native step, so the resample has real work to do.
pub fn synthesize_day(
    root: &Path,
    date: NaiveDate,
    band: &BandDescriptor,
    spec: &SampleSpec,
) -> anyhow::Result<Vec<PathBuf>> {
    let day_dir = root
        .join(date.format("%Y").to_string())
        .join(date.format("%m").to_string())
        .join(date.format("%d").to_string());
    fs::create_dir_all(&day_dir)
        .with_context(|| format!("creating day directory {}", day_dir.display()))?;

    let epoch_offset = epoch_offset_seconds(&band.epoch)?;
    let day_start = date
        .and_hms_opt(0, 0, 0)
        .context("building day start instant")?
        .and_utc()
        .timestamp() as f64;

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut written = Vec::with_capacity(spec.files);

    for file_index in 0..spec.files {
        let file_start = file_index as f64 * spec.samples_per_file as f64 * spec.native_time_step;
        let time: Vec<f64> = (0..spec.samples_per_file)
            .map(|k| {
                let jitter = rng.gen_range(-0.4..0.4);
                day_start - epoch_offset + file_start + k as f64 * spec.native_time_step + jitter
            })
            .collect();
        let range: Vec<f64> = (0..spec.range_bins)
            .map(|bin| bin as f64 * spec.range_step)
            .collect();

        let mut variables = BTreeMap::new();
        for name in &band.variables {
            let source = band.source_name(name);
            let values = (0..spec.samples_per_file)
                .map(|_| {
                    (0..spec.range_bins)
                        .map(|_| Some(moment_value(&mut rng, name)))
                        .collect()
                })
                .collect();
            variables.insert(
                source.to_string(),
                VariableDocument {
                    values,
                    units: None,
                },
            );
        }

        let document = MomentDocument {
            time,
            time_units: Some(format!("seconds since {}", band.epoch)),
            range,
            variables,
        };

        let seconds_into_day = (file_start as u64) % 86_400;
        let name = format!(
            "{}_{:02}{:02}{:02}.{}",
            date.format("%Y%m%d"),
            seconds_into_day / 3600,
            seconds_into_day % 3600 / 60,
            seconds_into_day % 60,
            band.file_ext
        );
        let path = day_dir.join(name);
        let contents = serde_json::to_string(&document)
            .with_context(|| format!("serializing synthetic file {}", path.display()))?;
        fs::write(&path, contents)
            .with_context(|| format!("writing synthetic file {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::RunConfig;

    #[test]
    fn generator_writes_discoverable_files() {
        let root = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2019, 1, 22).unwrap();
        let band = RunConfig::default()
            .band("ka")
            .unwrap()
            .to_descriptor("ka");

        let spec = SampleSpec {
            files: 2,
            samples_per_file: 5,
            range_bins: 4,
            ..SampleSpec::default()
        };
        let written = synthesize_day(root.path(), date, &band, &spec).unwrap();
        assert_eq!(written.len(), 2);

        let discovered =
            crate::discovery::moment_files(root.path(), date, &band.file_ext).unwrap();
        assert_eq!(discovered, written);

        let document: MomentDocument =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(document.time.len(), 5);
        assert_eq!(document.range.len(), 4);
        // Every configured variable is present under its source name.
        for name in &band.variables {
            assert!(document.variables.contains_key(band.source_name(name)));
        }
    }
}
