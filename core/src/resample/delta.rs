use ndarray::{Array2, ArrayView1};

/// Builds the dense signed-distance matrix between two axis grids.
pub struct DeltaComputer;

impl DeltaComputer {
    /// `delta[[i, j]] = source[j] - reference[i]`, one row per reference
    /// position. O(R·S) in time and space; fine at the grid sizes involved
    /// (hundreds of range bins, tens of thousands of time steps per day).
    pub fn compute(reference: ArrayView1<f64>, source: ArrayView1<f64>) -> Array2<f64> {
        Array2::from_shape_fn((reference.len(), source.len()), |(i, j)| {
            source[j] - reference[i]
        })
    }
}
