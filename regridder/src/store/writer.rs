use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fusecore::moments::dataset::Dataset;
use fusecore::prelude::{MomentWriter, ResampleError, ResampleResult, VariableEncoding};
use serde::{Deserialize, Serialize};

/// One resampled variable as persisted: values with `null` for NaN, the
/// units tag, and the encoding directive it was written under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputVariable {
    pub values: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub encoding: Option<VariableEncoding>,
}

/// On-disk layout of one resampled day: the reference coordinate arrays plus
/// the fused variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDocument {
    pub time: Vec<f64>,
    pub range: Vec<f64>,
    pub variables: BTreeMap<String, OutputVariable>,
}

impl OutputDocument {
    pub fn from_dataset(
        dataset: &Dataset,
        encodings: &BTreeMap<String, VariableEncoding>,
    ) -> Self {
        let mut variables = BTreeMap::new();
        for (name, variable) in &dataset.variables {
            let values = variable
                .values
                .rows()
                .into_iter()
                .map(|row| {
                    row.iter()
                        .map(|&cell| if cell.is_nan() { None } else { Some(cell) })
                        .collect()
                })
                .collect();
            variables.insert(
                name.clone(),
                OutputVariable {
                    values,
                    units: variable.units.clone(),
                    encoding: encodings.get(name).cloned(),
                },
            );
        }

        Self {
            time: dataset.time.to_vec(),
            range: dataset.range.to_vec(),
            variables,
        }
    }
}

/// Writes resampled days as JSON moment documents.
pub struct JsonMomentWriter;

impl MomentWriter for JsonMomentWriter {
    fn extension(&self) -> &str {
        "json"
    }

    fn write(
        &self,
        path: &Path,
        dataset: &Dataset,
        encodings: &BTreeMap<String, VariableEncoding>,
    ) -> ResampleResult<()> {
        let document = OutputDocument::from_dataset(dataset, encodings);
        let contents = serde_json::to_string(&document).map_err(|error| {
            ResampleError::FileRead {
                path: path.to_path_buf(),
                reason: format!("serializing dataset: {}", error),
            }
        })?;
        fs::write(path, contents).map_err(|error| ResampleError::FileRead {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
    }
}
