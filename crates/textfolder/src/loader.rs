// TextDataLoader: batching, shuffling, iteration

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::config::LabelMode;
use crate::dataset::{Dataset, TextSample};
use crate::error::Result;
use crate::labels::{LabelBatch, LabelEncoder};

/// Configuration for the TextDataLoader.
#[derive(Debug, Clone)]
pub struct DataLoaderConfig {
    /// Number of samples per batch. `None` yields single samples.
    pub batch_size: Option<usize>,
    /// Whether to shuffle sample order each epoch.
    pub shuffle: bool,
    /// Label encoding. `None` emits texts only.
    pub label_mode: Option<LabelMode>,
    /// 0 reads each batch sequentially; any positive value reads it in
    /// parallel on the rayon global pool.
    pub num_workers: usize,
    /// Optional random seed for reproducible shuffling.
    pub seed: Option<u64>,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: Some(32),
            shuffle: true,
            label_mode: Some(LabelMode::Int),
            num_workers: 0,
            seed: None,
        }
    }
}

impl DataLoaderConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = Some(bs);
        self
    }

    pub fn unbatched(mut self) -> Self {
        self.batch_size = None;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn label_mode(mut self, mode: Option<LabelMode>) -> Self {
        self.label_mode = mode;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }
}

/// A batch of texts with their encoded labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBatch {
    pub texts: Vec<String>,
    pub labels: Option<LabelBatch>,
}

impl TextBatch {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Shape of the text array: `[batch]`.
    pub fn text_shape(&self) -> Vec<usize> {
        vec![self.texts.len()]
    }
}

/// One item of a traversal: a batch, or a single sample when unbatched.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Batch(TextBatch),
    Single(TextSample),
}

impl Element {
    /// Number of samples carried by this element.
    pub fn len(&self) -> usize {
        match self {
            Element::Batch(b) => b.len(),
            Element::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text_shape(&self) -> Vec<usize> {
        match self {
            Element::Batch(b) => b.text_shape(),
            Element::Single(s) => s.text_shape(),
        }
    }

    pub fn into_batch(self) -> Option<TextBatch> {
        match self {
            Element::Batch(b) => Some(b),
            Element::Single(_) => None,
        }
    }

    pub fn into_single(self) -> Option<TextSample> {
        match self {
            Element::Single(s) => Some(s),
            Element::Batch(_) => None,
        }
    }
}

/// A TextDataLoader owns a Dataset and produces batches of texts and labels.
///
/// Every call to [`iter`](Self::iter) starts a new epoch: the sample order
/// is re-permuted (when shuffling) and the returned iterator walks the full
/// dataset once.
#[derive(Debug)]
pub struct TextDataLoader<D: Dataset> {
    dataset: D,
    config: DataLoaderConfig,
    encoder: Option<LabelEncoder>,
    indices: Vec<usize>,
    epoch: u64,
}

impl<D: Dataset> TextDataLoader<D> {
    /// Create a new loader over a dataset.
    ///
    /// Labels are emitted only when `config.label_mode` is set and the
    /// dataset carries raw labels.
    pub fn new(dataset: D, config: DataLoaderConfig) -> Self {
        let indices: Vec<usize> = (0..dataset.len()).collect();
        let has_targets = !dataset.is_empty() && dataset.target(0).is_some();
        let encoder = config
            .label_mode
            .filter(|_| has_targets)
            .map(|mode| LabelEncoder::new(mode, dataset.num_classes()));
        Self {
            dataset,
            config,
            encoder,
            indices,
            epoch: 0,
        }
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn config(&self) -> &DataLoaderConfig {
        &self.config
    }

    /// Label mode in effect, `None` when texts are emitted alone.
    pub fn label_mode(&self) -> Option<LabelMode> {
        self.encoder.map(|e| e.mode)
    }

    pub fn class_names(&self) -> &[String] {
        self.dataset.class_names()
    }

    pub fn num_classes(&self) -> usize {
        self.dataset.num_classes()
    }

    /// Sample paths in dataset order (before per-epoch shuffling).
    pub fn file_paths(&self) -> Vec<&std::path::Path> {
        (0..self.dataset.len()).map(|i| self.dataset.path(i)).collect()
    }

    /// The number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        match self.config.batch_size {
            Some(bs) => self.dataset.len().div_ceil(bs),
            None => self.dataset.len(),
        }
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Epochs started so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Re-permute sample order for the next epoch.
    ///
    /// With a seed, epoch `k` always gets the same order, so two loaders
    /// built the same way replay identical sequences.
    fn reshuffle(&mut self) {
        if !self.config.shuffle {
            return;
        }
        match self.config.seed {
            Some(seed) => {
                self.indices = (0..self.dataset.len()).collect();
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(self.epoch));
                self.indices.shuffle(&mut rng);
            }
            None => {
                let mut rng = thread_rng();
                self.indices.shuffle(&mut rng);
            }
        }
        debug!("epoch {}: reshuffled {} samples", self.epoch, self.indices.len());
    }

    /// Read the texts at `indices`, optionally in parallel via rayon.
    fn fetch_texts(&self, indices: &[usize]) -> Result<Vec<String>> {
        if self.config.num_workers > 0 && indices.len() > 1 {
            indices.par_iter().map(|&i| self.dataset.text(i)).collect()
        } else {
            indices.iter().map(|&i| self.dataset.text(i)).collect()
        }
    }

    fn make_batch(&self, indices: &[usize]) -> Result<TextBatch> {
        let texts = self.fetch_texts(indices)?;
        let labels = self.encoder.map(|enc| {
            let targets: Vec<usize> = indices
                .iter()
                .map(|&i| self.dataset.target(i).unwrap_or(0))
                .collect();
            enc.encode_batch(&targets)
        });
        Ok(TextBatch { texts, labels })
    }

    fn make_single(&self, index: usize) -> Result<TextSample> {
        let text = self.dataset.text(index)?;
        let label = self
            .encoder
            .map(|enc| enc.encode(self.dataset.target(index).unwrap_or(0)));
        Ok(TextSample { text, label })
    }

    /// Produce every element of one epoch.
    pub fn epoch_elements(&mut self) -> Result<Vec<Element>> {
        self.iter().collect()
    }

    /// Start a new epoch and iterate over it one element at a time.
    pub fn iter(&mut self) -> Elements<'_, D> {
        self.reshuffle();
        self.epoch += 1;
        Elements {
            loader: self,
            position: 0,
        }
    }
}

/// Iterator over one epoch of a [`TextDataLoader`].
pub struct Elements<'l, D: Dataset> {
    loader: &'l TextDataLoader<D>,
    position: usize,
}

impl<'l, D: Dataset> Iterator for Elements<'l, D> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.loader.indices.len();
        let start = self.position;
        if start >= n {
            return None;
        }

        match self.loader.config.batch_size {
            Some(bs) => {
                let end = (start + bs).min(n);
                self.position = end;
                let batch_indices = &self.loader.indices[start..end];
                Some(self.loader.make_batch(batch_indices).map(Element::Batch))
            }
            None => {
                self.position += 1;
                let index = self.loader.indices[start];
                Some(self.loader.make_single(index).map(Element::Single))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.loader.indices.len().saturating_sub(self.position);
        let items = match self.loader.config.batch_size {
            Some(bs) => remaining.div_ceil(bs),
            None => remaining,
        };
        (items, Some(items))
    }
}

impl<'l, D: Dataset> ExactSizeIterator for Elements<'l, D> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;
    use std::path::{Path, PathBuf};

    /// In-memory dataset: text is the index, label is `index % classes`.
    struct ToyDataset {
        paths: Vec<PathBuf>,
        classes: usize,
        labelled: bool,
    }

    impl ToyDataset {
        fn new(n: usize, classes: usize) -> Self {
            Self {
                paths: (0..n).map(|i| PathBuf::from(format!("{i}.txt"))).collect(),
                classes,
                labelled: true,
            }
        }

        fn unlabelled(n: usize) -> Self {
            Self {
                labelled: false,
                ..Self::new(n, 0)
            }
        }
    }

    impl Dataset for ToyDataset {
        fn len(&self) -> usize {
            self.paths.len()
        }
        fn text(&self, index: usize) -> Result<String> {
            Ok(index.to_string())
        }
        fn target(&self, index: usize) -> Option<usize> {
            self.labelled.then(|| index % self.classes)
        }
        fn path(&self, index: usize) -> &Path {
            &self.paths[index]
        }
        fn class_names(&self) -> &[String] {
            &[]
        }
        fn num_classes(&self) -> usize {
            self.classes
        }
    }

    fn texts(elements: &[Element]) -> Vec<String> {
        elements
            .iter()
            .flat_map(|e| match e {
                Element::Batch(b) => b.texts.clone(),
                Element::Single(s) => vec![s.text.clone()],
            })
            .collect()
    }

    #[test]
    fn num_batches() {
        let config = DataLoaderConfig::default().batch_size(3);
        let loader = TextDataLoader::new(ToyDataset::new(10, 2), config);
        // 10 / 3 = 3 full + 1 partial = 4
        assert_eq!(loader.num_batches(), 4);

        let config = DataLoaderConfig::default().unbatched();
        let loader = TextDataLoader::new(ToyDataset::new(10, 2), config);
        assert_eq!(loader.num_batches(), 10);
    }

    #[test]
    fn batches_keep_order_without_shuffle() {
        let config = DataLoaderConfig::default().batch_size(4).shuffle(false);
        let mut loader = TextDataLoader::new(ToyDataset::new(10, 3), config);
        let elements = loader.epoch_elements().unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[2].len(), 2);
        let b0 = elements[0].clone().into_batch().unwrap();
        assert_eq!(b0.texts, vec!["0", "1", "2", "3"]);
        assert_eq!(b0.labels, Some(LabelBatch::Int(vec![0, 1, 2, 0])));
    }

    #[test]
    fn categorical_batches() {
        let config = DataLoaderConfig::default()
            .batch_size(5)
            .shuffle(false)
            .label_mode(Some(LabelMode::Categorical));
        let mut loader = TextDataLoader::new(ToyDataset::new(5, 3), config);
        let batch = loader.iter().next().unwrap().unwrap().into_batch().unwrap();
        let labels = batch.labels.unwrap();
        assert_eq!(labels.shape(), vec![5, 3]);
        assert_eq!(labels.row(4), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn unlabelled_dataset_emits_texts_only() {
        let config = DataLoaderConfig::default();
        let mut loader = TextDataLoader::new(ToyDataset::unlabelled(3), config);
        assert_eq!(loader.label_mode(), None);
        let batch = loader.iter().next().unwrap().unwrap().into_batch().unwrap();
        assert!(batch.labels.is_none());
        assert_eq!(batch.text_shape(), vec![3]);
    }

    #[test]
    fn unbatched_samples() {
        let config = DataLoaderConfig::default().unbatched().shuffle(false);
        let mut loader = TextDataLoader::new(ToyDataset::new(3, 2), config);
        let it = loader.iter();
        assert_eq!(it.len(), 3);
        let samples: Vec<TextSample> = it.map(|e| e.unwrap().into_single().unwrap()).collect();
        assert_eq!(samples[1].label, Some(Label::Int(1)));
        assert!(samples[1].text_shape().is_empty());
    }

    #[test]
    fn restartable_and_complete() {
        let config = DataLoaderConfig::default().batch_size(4);
        let mut loader = TextDataLoader::new(ToyDataset::new(30, 2), config);
        for _ in 0..3 {
            let mut seen = texts(&loader.epoch_elements().unwrap());
            seen.sort_by_key(|t| t.parse::<usize>().unwrap());
            let expected: Vec<String> = (0..30).map(|i| i.to_string()).collect();
            assert_eq!(seen, expected);
        }
        assert_eq!(loader.epoch(), 3);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let config = DataLoaderConfig::default().batch_size(50).seed(42);
        let mut a = TextDataLoader::new(ToyDataset::new(50, 2), config.clone());
        let mut b = TextDataLoader::new(ToyDataset::new(50, 2), config);
        let a1 = texts(&a.epoch_elements().unwrap());
        let a2 = texts(&a.epoch_elements().unwrap());
        assert_eq!(a1, texts(&b.epoch_elements().unwrap()));
        assert_eq!(a2, texts(&b.epoch_elements().unwrap()));
        assert_ne!(a1, a2, "each epoch should get its own order");
    }

    #[test]
    fn parallel_fetch_preserves_order() {
        let config = DataLoaderConfig::default()
            .batch_size(16)
            .shuffle(false)
            .num_workers(4);
        let mut loader = TextDataLoader::new(ToyDataset::new(16, 2), config);
        let batch = loader.iter().next().unwrap().unwrap().into_batch().unwrap();
        let expected: Vec<String> = (0..16).map(|i| i.to_string()).collect();
        assert_eq!(batch.texts, expected);
    }
}
