// TextFolderConfig: every knob of a directory-backed text dataset
//
// The config is plain data. `validate()` runs the checks that need no
// filesystem access; the remaining checks (class names against the actual
// subdirectories, explicit label counts, binary class count) happen during
// discovery in `TextFolder::scan`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::loader::DataLoaderConfig;

// Labels: where label values come from

/// Source of the label attached to each sample.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Labels {
    /// Labels are class indices derived from the first directory level.
    #[default]
    Inferred,
    /// One label per discovered file, in discovery order (sorted paths).
    Explicit(Vec<usize>),
    /// No labels; the dataset yields texts only.
    None,
}

impl Labels {
    pub fn is_inferred(&self) -> bool {
        matches!(self, Labels::Inferred)
    }
}

impl FromStr for Labels {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inferred" => Ok(Labels::Inferred),
            "none" | "None" => Ok(Labels::None),
            other => Err(Error::config(format!(
                "`labels` argument should be a list of integer labels, of the same size \
                 as the number of text files in the target directory. If you wish to infer \
                 the labels from the subdirectory names in the target directory, pass \
                 `labels=\"inferred\"`. If you wish to get a dataset that only contains text \
                 samples (no labels), pass `labels=\"none\"`. Received: labels={other}"
            ))),
        }
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Labels::Inferred => write!(f, "inferred"),
            Labels::Explicit(v) => write!(f, "{v:?}"),
            Labels::None => write!(f, "none"),
        }
    }
}

// LabelMode: how labels are encoded

/// Encoding of labels in the emitted batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    /// Scalar `i32` class index; batch shape `[batch]`.
    Int,
    /// `f32` 0.0 / 1.0; batch shape `[batch, 1]`. Requires two classes.
    Binary,
    /// One-hot `f32` rows; batch shape `[batch, num_classes]`.
    Categorical,
}

impl LabelMode {
    /// Parse a label mode where `"none"` means "emit no labels".
    pub fn parse_optional(s: &str) -> Result<Option<LabelMode>> {
        match s {
            "none" | "None" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl FromStr for LabelMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(LabelMode::Int),
            "binary" => Ok(LabelMode::Binary),
            "categorical" => Ok(LabelMode::Categorical),
            other => Err(Error::config(format!(
                "`label_mode` argument must be one of \"int\", \"categorical\", \"binary\", \
                 or none. Received: label_mode={other}"
            ))),
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LabelMode::Int => "int",
            LabelMode::Binary => "binary",
            LabelMode::Categorical => "categorical",
        };
        f.write_str(s)
    }
}

// Subset

/// Which side of a validation split to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    Training,
    Validation,
}

impl FromStr for Subset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "training" => Ok(Subset::Training),
            "validation" => Ok(Subset::Validation),
            other => Err(Error::config(format!(
                "`subset` must be either \"training\" or \"validation\", received: {other}"
            ))),
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subset::Training => f.write_str("training"),
            Subset::Validation => f.write_str("validation"),
        }
    }
}

// TextFolderConfig

/// Configuration for building a text dataset from a directory.
#[derive(Debug, Clone)]
pub struct TextFolderConfig {
    /// Source of labels.
    pub labels: Labels,
    /// Label encoding. `None` emits texts only, whatever `labels` says.
    pub label_mode: Option<LabelMode>,
    /// Explicit class ordering; must name exactly the class subdirectories.
    pub class_names: Option<Vec<String>>,
    /// Samples per batch. `None` yields single samples without a batch dim.
    pub batch_size: Option<usize>,
    /// Truncate every text to at most this many characters.
    pub max_length: Option<usize>,
    /// Shuffle the file list, and re-shuffle at every traversal.
    pub shuffle: bool,
    /// Random seed for shuffling and splitting.
    pub seed: Option<u64>,
    /// Fraction of samples reserved for validation. `0.0` means unset.
    pub validation_split: Option<f64>,
    /// Which side of the split to keep.
    pub subset: Option<Subset>,
    /// Traverse symlinked directories.
    pub follow_links: bool,
    /// 0 reads each batch sequentially; any positive value reads it in
    /// parallel on the rayon global pool.
    pub num_workers: usize,
}

impl Default for TextFolderConfig {
    fn default() -> Self {
        Self {
            labels: Labels::Inferred,
            label_mode: Some(LabelMode::Int),
            class_names: None,
            batch_size: Some(32),
            max_length: None,
            shuffle: true,
            seed: None,
            validation_split: None,
            subset: None,
            follow_links: false,
            num_workers: 0,
        }
    }
}

impl TextFolderConfig {
    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn label_mode(mut self, mode: Option<LabelMode>) -> Self {
        self.label_mode = mode;
        self
    }

    pub fn class_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.class_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = Some(bs);
        self
    }

    /// Yield one sample at a time instead of batches.
    pub fn unbatched(mut self) -> Self {
        self.batch_size = None;
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }

    pub fn validation_split(mut self, fraction: f64) -> Self {
        self.validation_split = Some(fraction);
        self
    }

    pub fn subset(mut self, subset: Subset) -> Self {
        self.subset = Some(subset);
        self
    }

    pub fn follow_links(mut self, f: bool) -> Self {
        self.follow_links = f;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// The label source actually used: `label_mode = None` disables labels.
    pub fn effective_labels(&self) -> &Labels {
        if self.label_mode.is_none() {
            &Labels::None
        } else {
            &self.labels
        }
    }

    /// The effective label mode: `None` whenever labels are disabled.
    pub fn effective_label_mode(&self) -> Option<LabelMode> {
        match self.labels {
            Labels::None => None,
            _ => self.label_mode,
        }
    }

    /// The validation fraction, treating `0.0` as unset.
    pub fn split_fraction(&self) -> Option<f64> {
        self.validation_split.filter(|&v| v != 0.0)
    }

    /// Loader settings matching this config.
    pub fn loader_config(&self) -> DataLoaderConfig {
        DataLoaderConfig {
            batch_size: self.batch_size,
            shuffle: self.shuffle,
            label_mode: self.effective_label_mode(),
            num_workers: self.num_workers,
            seed: self.seed,
        }
    }

    /// Check every argument constraint that does not need the filesystem.
    pub fn validate(&self) -> Result<()> {
        if !self.labels.is_inferred() {
            if let Some(names) = &self.class_names {
                return Err(Error::config(format!(
                    "You can only pass `class_names` if `labels=\"inferred\"`. \
                     Received: labels={}, and class_names={names:?}",
                    self.labels
                )));
            }
        }

        if self.batch_size == Some(0) {
            crate::bail!("`batch_size` must be positive, received: 0");
        }
        if self.max_length == Some(0) {
            crate::bail!("`max_length` must be positive, received: 0");
        }

        let split = self.split_fraction();
        if let Some(v) = split {
            if !(v > 0.0 && v < 1.0) {
                crate::bail!("`validation_split` must be between 0 and 1, received: {v}");
            }
        }
        if split.is_some() != self.subset.is_some() {
            crate::bail!("If `subset` is set, `validation_split` must be set, and inversely.");
        }
        if split.is_some() && self.shuffle && self.seed.is_none() {
            crate::bail!(
                "If using `validation_split` and shuffling the data, you must provide a \
                 `seed` argument, to make sure that there is no overlap between the \
                 training and validation subset."
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(r: Result<()>) -> String {
        r.expect_err("expected a configuration error").to_string()
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = TextFolderConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.batch_size, Some(32));
        assert_eq!(cfg.label_mode, Some(LabelMode::Int));
        assert!(cfg.shuffle);
        assert!(!cfg.follow_links);
    }

    #[test]
    fn parse_labels() {
        assert_eq!("inferred".parse::<Labels>().unwrap(), Labels::Inferred);
        assert_eq!("none".parse::<Labels>().unwrap(), Labels::None);
        let err = "other".parse::<Labels>().unwrap_err().to_string();
        assert!(err.contains("`labels` argument should be"), "{err}");
    }

    #[test]
    fn parse_label_mode() {
        assert_eq!("binary".parse::<LabelMode>().unwrap(), LabelMode::Binary);
        assert_eq!(LabelMode::parse_optional("none").unwrap(), None);
        assert_eq!(
            LabelMode::parse_optional("categorical").unwrap(),
            Some(LabelMode::Categorical)
        );
        let err = LabelMode::parse_optional("other").unwrap_err().to_string();
        assert!(err.contains("`label_mode` argument must be"), "{err}");
    }

    #[test]
    fn parse_subset() {
        assert_eq!("training".parse::<Subset>().unwrap(), Subset::Training);
        let err = "other".parse::<Subset>().unwrap_err().to_string();
        assert!(err.contains("`subset` must be either \"training\" or"), "{err}");
    }

    #[test]
    fn class_names_need_inferred_labels() {
        let cfg = TextFolderConfig::default()
            .labels(Labels::Explicit(vec![0, 0, 1, 1, 1]))
            .class_names(["class_0", "class_1", "class_2"]);
        let err = message(cfg.validate());
        assert!(err.contains("only pass `class_names` if `labels=\"inferred\"`"), "{err}");
    }

    #[test]
    fn split_out_of_range() {
        let cfg = TextFolderConfig::default()
            .validation_split(2.0)
            .subset(Subset::Training)
            .seed(1);
        assert!(message(cfg.validate()).contains("`validation_split` must be between 0 and 1"));
    }

    #[test]
    fn zero_split_counts_as_unset() {
        let cfg = TextFolderConfig::default()
            .validation_split(0.0)
            .subset(Subset::Training);
        assert!(message(cfg.validate()).contains("`validation_split` must be set"));
    }

    #[test]
    fn split_without_subset() {
        let cfg = TextFolderConfig::default().validation_split(0.2).seed(3);
        assert!(message(cfg.validate()).contains("`validation_split` must be set, and inversely"));
    }

    #[test]
    fn split_with_shuffle_needs_seed() {
        let cfg = TextFolderConfig::default()
            .validation_split(0.2)
            .subset(Subset::Training);
        assert!(message(cfg.validate()).contains("must provide a `seed`"));

        // Without shuffling the split is already deterministic.
        let cfg = cfg.shuffle(false);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_rejected() {
        let cfg = TextFolderConfig::default().batch_size(0);
        assert!(message(cfg.validate()).contains("`batch_size` must be positive"));
    }

    #[test]
    fn label_mode_none_disables_labels() {
        let cfg = TextFolderConfig::default().label_mode(None);
        assert_eq!(cfg.effective_labels(), &Labels::None);
        let cfg = TextFolderConfig::default().labels(Labels::None);
        assert_eq!(cfg.effective_label_mode(), None);
    }
}
