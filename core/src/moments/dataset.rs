use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::prelude::{ResampleError, ResampleResult};

/// A named (time x range) measurement array owned by a dataset.
#[derive(Debug, Clone)]
pub struct Variable {
    pub values: Array2<f64>,
    pub units: Option<String>,
}

/// Immutable value type carrying the merged variables of one instrument day
/// plus the coordinate arrays describing their two axes. Every pipeline step
/// builds a new `Dataset` instead of mutating in place.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub time: Array1<f64>,
    pub range: Array1<f64>,
    pub variables: BTreeMap<String, Variable>,
}

impl Dataset {
    pub fn new(time: Array1<f64>, range: Array1<f64>) -> Self {
        Self {
            time,
            range,
            variables: BTreeMap::new(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn sample_count(&self) -> usize {
        self.time.len()
    }

    /// Checks that every listed variable exists and is shaped to the
    /// coordinate arrays. Violations are structural: malformed upstream data
    /// that retrying cannot fix.
    pub fn ensure_complete(&self, names: &[String]) -> ResampleResult<()> {
        for name in names {
            let variable = self.variables.get(name).ok_or_else(|| {
                ResampleError::Structural(format!("variable {} missing after merge", name))
            })?;
            let expected = (self.time.len(), self.range.len());
            let actual = (variable.values.nrows(), variable.values.ncols());
            if actual != expected {
                return Err(ResampleError::Structural(format!(
                    "variable {} shaped {:?}, coordinates demand {:?}",
                    name, actual, expected
                )));
            }
        }
        Ok(())
    }
}
