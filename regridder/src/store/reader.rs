use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use fusecore::moments::raw::RawMoments;
use fusecore::prelude::{MomentReader, ResampleError, ResampleResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// One variable as persisted in a moment document. `null` cells are missing
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDocument {
    pub values: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    pub units: Option<String>,
}

/// On-disk layout of one instrument moment file: native coordinate arrays
/// plus named (time x range) variables. Timestamps are raw seconds counted
/// from the instrument epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentDocument {
    pub time: Vec<f64>,
    #[serde(default)]
    pub time_units: Option<String>,
    pub range: Vec<f64>,
    pub variables: BTreeMap<String, VariableDocument>,
}

/// Seconds between the Unix epoch and an instrument reference instant such
/// as "2001-01-01 00:00:00" (a trailing " UTC" is accepted).
pub fn epoch_offset_seconds(epoch: &str) -> ResampleResult<f64> {
    let trimmed = epoch.trim().trim_end_matches(" UTC");
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map_err(|error| {
        ResampleError::Config(format!("unparseable epoch {:?}: {}", epoch, error))
    })?;
    Ok(parsed.and_utc().timestamp() as f64)
}

/// Reads JSON moment documents, shifting raw timestamps onto the Unix axis.
///
/// The epoch comes from the band descriptor, not the file: the configured
/// reference instant is authoritative even when a file carries its own
/// `time_units` attribute.
pub struct JsonMomentReader {
    epoch_offset: f64,
}

impl JsonMomentReader {
    pub fn new(epoch: &str) -> ResampleResult<Self> {
        Ok(Self {
            epoch_offset: epoch_offset_seconds(epoch)?,
        })
    }
}

fn file_error(path: &Path, reason: String) -> ResampleError {
    ResampleError::FileRead {
        path: path.to_path_buf(),
        reason,
    }
}

impl MomentReader for JsonMomentReader {
    fn read(&self, path: &Path) -> ResampleResult<RawMoments> {
        let contents =
            fs::read_to_string(path).map_err(|error| file_error(path, error.to_string()))?;
        let document: MomentDocument =
            serde_json::from_str(&contents).map_err(|error| file_error(path, error.to_string()))?;

        let time = Array1::from_iter(
            document
                .time
                .iter()
                .map(|&seconds| seconds + self.epoch_offset),
        );
        let range = Array1::from_vec(document.range);

        let mut moments = RawMoments::new(time, range);
        for (name, variable) in document.variables {
            let rows = variable.values.len();
            if rows != moments.time.len() {
                return Err(file_error(
                    path,
                    format!(
                        "variable {} has {} rows for {} timestamps",
                        name,
                        rows,
                        moments.time.len()
                    ),
                ));
            }

            let mut flat = Vec::with_capacity(rows * moments.range.len());
            for row in &variable.values {
                if row.len() != moments.range.len() {
                    return Err(file_error(
                        path,
                        format!(
                            "variable {} has a row of {} cells for {} range bins",
                            name,
                            row.len(),
                            moments.range.len()
                        ),
                    ));
                }
                flat.extend(row.iter().map(|cell| cell.unwrap_or(f64::NAN)));
            }

            let values = Array2::from_shape_vec((rows, moments.range.len()), flat)
                .map_err(|error| file_error(path, error.to_string()))?;
            moments.insert(&name, values, variable.units.clone());
        }

        Ok(moments)
    }
}
