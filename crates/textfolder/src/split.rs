// Training / validation split
//
// The file list is already shuffled by seed during indexing, so the split
// itself is a plain slice: the last `ceil(fraction * n)` samples are the
// validation subset and everything before them is the training subset. Two
// datasets built from the same directory with the same seed therefore get
// complementary, non-overlapping subsets.

use std::ops::Range;
use std::path::Path;

use tracing::info;

use crate::config::Subset;
use crate::dataset::Dataset;
use crate::error::Result;

// SubsetDataset: view of selected indices

/// A dataset that exposes only the samples at the given indices.
#[derive(Debug)]
pub struct SubsetDataset<D: Dataset> {
    inner: D,
    indices: Vec<usize>,
}

impl<D: Dataset> SubsetDataset<D> {
    /// Create a subset of `inner` containing only the samples at `indices`.
    ///
    /// # Panics
    /// Panics (lazily, at access time) if any index is out of range.
    pub fn new(inner: D, indices: Vec<usize>) -> Self {
        Self { inner, indices }
    }

    /// A subset spanning the whole of `inner`.
    pub fn full(inner: D) -> Self {
        let indices = (0..inner.len()).collect();
        Self { inner, indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<D: Dataset> Dataset for SubsetDataset<D> {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn text(&self, index: usize) -> Result<String> {
        self.inner.text(self.indices[index])
    }

    fn target(&self, index: usize) -> Option<usize> {
        self.inner.target(self.indices[index])
    }

    fn path(&self, index: usize) -> &Path {
        self.inner.path(self.indices[index])
    }

    fn class_names(&self) -> &[String] {
        self.inner.class_names()
    }

    fn num_classes(&self) -> usize {
        self.inner.num_classes()
    }
}

/// Number of samples reserved for validation out of `n`.
///
/// Rounds up, with a small tolerance so that products which are integral in
/// exact arithmetic (`0.7 * 10`) do not round up to the next integer.
pub fn num_validation_samples(n: usize, fraction: f64) -> usize {
    let exact = fraction * n as f64;
    ((exact - 1e-9).ceil().max(0.0) as usize).min(n)
}

/// Index range of `subset` within a dataset of `n` samples.
pub fn subset_range(n: usize, fraction: f64, subset: Subset) -> Range<usize> {
    let num_val = num_validation_samples(n, fraction);
    match subset {
        Subset::Training => 0..n - num_val,
        Subset::Validation => n - num_val..n,
    }
}

/// Restrict `dataset` to the requested side of a validation split.
///
/// With no split configured the whole dataset is returned.
pub fn training_or_validation_split<D: Dataset>(
    dataset: D,
    validation_split: Option<f64>,
    subset: Option<Subset>,
) -> SubsetDataset<D> {
    match (validation_split, subset) {
        (Some(fraction), Some(subset)) => {
            let range = subset_range(dataset.len(), fraction, subset);
            info!("Using {} files for {}.", range.len(), subset);
            SubsetDataset::new(dataset, range.collect())
        }
        _ => SubsetDataset::full(dataset),
    }
}
