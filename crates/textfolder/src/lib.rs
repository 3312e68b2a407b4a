//! # textfolder
//!
//! Directory-based text classification datasets.
//!
//! This crate provides:
//! - [`TextFolderConfig`]: every option, validated eagerly before any I/O
//! - [`TextFolder`]: index a directory tree whose subdirectories are classes
//! - [`TextDataLoader`]: restartable batching and shuffling over a [`Dataset`]
//! - [`text_dataset_from_directory`]: all of the above in one call
//
//   - Label encodings: int, binary, one-hot categorical
//   - Deterministic training/validation split by seed
//   - Unbatched (single sample) iteration
//   - Optional parallel reads within a batch (rayon)

pub mod config;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod labels;
pub mod loader;
pub mod split;
pub mod text_folder;

use std::path::Path;

use tracing::info;

pub use config::{LabelMode, Labels, Subset, TextFolderConfig};
pub use dataset::{Dataset, TextSample};
pub use discovery::{index_directory, DirectoryIndex};
pub use error::{Error, Result};
pub use labels::{Label, LabelBatch, LabelEncoder};
pub use loader::{DataLoaderConfig, Element, Elements, TextBatch, TextDataLoader};
pub use split::{training_or_validation_split, SubsetDataset};
pub use text_folder::{TextFolder, TextFolderBuilder};

/// The loader returned by [`text_dataset_from_directory`].
pub type DirectoryDataset = TextDataLoader<SubsetDataset<TextFolder>>;

/// Build a batched text dataset from a directory of `.txt` files.
///
/// Validation, discovery and the training/validation split all happen here,
/// so every configuration error is reported before the first batch is read.
///
/// # Example
/// ```ignore
/// let mut ds = text_dataset_from_directory(
///     "data/reviews",
///     TextFolderConfig::default()
///         .batch_size(8)
///         .validation_split(0.2)
///         .subset(Subset::Training)
///         .seed(1337),
/// )?;
/// for element in ds.iter() {
///     let batch = element?.into_batch().unwrap();
///     println!("{:?}", batch.text_shape());
/// }
/// ```
pub fn text_dataset_from_directory<P: AsRef<Path>>(
    root: P,
    config: TextFolderConfig,
) -> Result<DirectoryDataset> {
    let root = root.as_ref();
    let folder = TextFolder::new(root).config(config.clone()).build()?;
    let subset = training_or_validation_split(folder, config.split_fraction(), config.subset);
    if subset.is_empty() {
        return Err(Error::NoTextFiles(root.to_path_buf()));
    }

    let loader = TextDataLoader::new(subset, config.loader_config());
    info!(
        "{} samples in {} batches from {:?}",
        loader.len(),
        loader.num_batches(),
        root
    );
    Ok(loader)
}
