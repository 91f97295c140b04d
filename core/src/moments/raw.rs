use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

/// One variable as it came off the instrument file, aligned to the file's
/// native (time, range) grids.
#[derive(Debug, Clone)]
pub struct RawVariable {
    pub values: Array2<f64>,
    pub units: Option<String>,
}

/// The reader-facing view of one instrument file: native coordinate arrays
/// plus the named variables found in the file. Timestamps are absolute
/// seconds; the reader has already applied the instrument epoch.
#[derive(Debug, Clone)]
pub struct RawMoments {
    pub time: Array1<f64>,
    pub range: Array1<f64>,
    pub variables: BTreeMap<String, RawVariable>,
}

impl RawMoments {
    pub fn new(time: Array1<f64>, range: Array1<f64>) -> Self {
        Self {
            time,
            range,
            variables: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, values: Array2<f64>, units: Option<String>) {
        self.variables
            .insert(name.to_string(), RawVariable { values, units });
    }
}
