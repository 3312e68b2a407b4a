// Dataset trait: unified interface over indexed text samples

use std::path::Path;

use crate::error::Result;
use crate::labels::Label;

/// A single emitted sample: the (possibly truncated) text and its encoded
/// label, if labels are enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSample {
    pub text: String,
    pub label: Option<Label>,
}

impl TextSample {
    /// Shape of the text value. A single sample has no batch dimension.
    pub fn text_shape(&self) -> Vec<usize> {
        Vec::new()
    }
}

/// A dataset is an indexed collection of text files with optional raw labels.
///
/// Implementations must be `Send + Sync` so the loader can read a batch from
/// several threads when `num_workers > 0`.
pub trait Dataset: Send + Sync {
    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the text of the sample at position `index`.
    ///
    /// # Panics
    /// May panic if `index >= self.len()`.
    fn text(&self, index: usize) -> Result<String>;

    /// Raw label (class index) of the sample at `index`, if any.
    fn target(&self, index: usize) -> Option<usize>;

    /// Path of the file backing the sample at `index`.
    fn path(&self, index: usize) -> &Path;

    /// Class names in index order; empty when classes are not inferred.
    fn class_names(&self) -> &[String];

    /// Number of distinct label values.
    fn num_classes(&self) -> usize;
}
