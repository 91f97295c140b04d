use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::resample::nearest::IndexMap;

/// Remaps variable values from a source grid onto a reference grid using a
/// resolved index map. Unmatched positions become NaN; the input is never
/// aliased or mutated.
pub struct AxisResampler;

impl AxisResampler {
    /// Remaps a 1-D slice aligned to the source grid.
    pub fn remap(values: ArrayView1<f64>, index_map: &IndexMap) -> Array1<f64> {
        let mut resampled = Array1::from_elem(index_map.len(), f64::NAN);
        for (i, entry) in index_map.entries().iter().enumerate() {
            if let Some(j) = *entry {
                if j < values.len() {
                    resampled[i] = values[j];
                }
            }
        }
        resampled
    }

    /// Remaps a 2-D variable along `axis` (0 = time rows, 1 = range columns).
    /// The orthogonal axis is untouched.
    pub fn remap_axis(values: ArrayView2<f64>, index_map: &IndexMap, axis: Axis) -> Array2<f64> {
        let shape = match axis {
            Axis(0) => (index_map.len(), values.ncols()),
            _ => (values.nrows(), index_map.len()),
        };
        let mut resampled = Array2::from_elem(shape, f64::NAN);

        let source_len = values.len_of(axis);
        for (i, entry) in index_map.entries().iter().enumerate() {
            if let Some(j) = *entry {
                if j < source_len {
                    resampled
                        .index_axis_mut(axis, i)
                        .assign(&values.index_axis(axis, j));
                }
            }
        }
        resampled
    }
}
