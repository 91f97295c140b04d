use ndarray::ArrayView2;

/// Per-reference-position lookup into a source grid.
///
/// Each entry is the index of the closest source position, or `None` where no
/// source position lies within tolerance. `min_distances` keeps the minimum
/// absolute distance per row for diagnostics.
#[derive(Debug, Clone)]
pub struct IndexMap {
    entries: Vec<Option<usize>>,
    min_distances: Vec<f64>,
}

impl IndexMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, reference_index: usize) -> Option<usize> {
        self.entries.get(reference_index).copied().flatten()
    }

    pub fn entries(&self) -> &[Option<usize>] {
        &self.entries
    }

    pub fn min_distances(&self) -> &[f64] {
        &self.min_distances
    }

    pub fn matched_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }
}

/// Reduces a delta matrix to the nearest source index per reference row.
pub struct NearestIndexResolver;

impl NearestIndexResolver {
    /// Stable argmin of `|delta|` per row: ties keep the lowest source index.
    /// Rows whose minimum absolute distance exceeds `tolerance` are left
    /// unmatched. An empty source grid leaves every row unmatched; missing
    /// instrument data is not an error.
    pub fn resolve(delta: ArrayView2<f64>, tolerance: f64) -> IndexMap {
        let rows = delta.nrows();
        let mut entries = Vec::with_capacity(rows);
        let mut min_distances = Vec::with_capacity(rows);

        for row in delta.rows() {
            let mut best: Option<(usize, f64)> = None;
            for (j, &value) in row.iter().enumerate() {
                let distance = value.abs();
                if best.map_or(true, |(_, current)| distance < current) {
                    best = Some((j, distance));
                }
            }

            match best {
                Some((j, distance)) if distance <= tolerance => {
                    entries.push(Some(j));
                    min_distances.push(distance);
                }
                Some((_, distance)) => {
                    entries.push(None);
                    min_distances.push(distance);
                }
                None => {
                    entries.push(None);
                    min_distances.push(f64::INFINITY);
                }
            }
        }

        IndexMap {
            entries,
            min_distances,
        }
    }
}
