// TextFolder: directory-based text classification dataset
//
// Indexes a directory tree where each first-level subdirectory is a class:
//
//   root/
//     class_a/
//       doc_001.txt
//       doc_002.txt
//     class_b/
//       doc_003.txt
//       ...
//
// Class labels are assigned as sorted indices of subdirectory names (or the
// order of an explicit `class_names` list). Only paths are kept in memory;
// texts are read when a sample is requested.
//
// USAGE:
//
//   let ds = TextFolder::new("data/reviews/train")
//       .config(TextFolderConfig::default().max_length(512))
//       .build()?;
//   println!("{} files, {} classes", ds.len(), ds.num_classes());

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::config::{LabelMode, TextFolderConfig};
use crate::dataset::Dataset;
use crate::discovery::index_directory;
use crate::error::{Error, Result};

/// Read a file as text, keeping at most `max_length` characters.
///
/// A character takes at most four bytes in UTF-8, so no more than
/// `4 * max_length` bytes are read. Invalid UTF-8 is replaced lossily. The
/// file handle is dropped before returning.
pub fn read_text(path: &Path, max_length: Option<usize>) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut bytes = Vec::new();
    let read = match max_length {
        Some(n) => (&mut file)
            .take((n as u64).saturating_mul(4))
            .read_to_end(&mut bytes),
        None => file.read_to_end(&mut bytes),
    };
    read.map_err(|e| Error::io(path, e))?;

    let text = String::from_utf8_lossy(&bytes);
    Ok(match max_length {
        Some(n) => text.chars().take(n).collect(),
        None => text.into_owned(),
    })
}

// TextFolderBuilder

/// Builder for [`TextFolder`].
pub struct TextFolderBuilder {
    root: PathBuf,
    config: TextFolderConfig,
}

impl TextFolderBuilder {
    /// Create a builder rooted at the given directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        TextFolderBuilder {
            root: root.as_ref().to_path_buf(),
            config: TextFolderConfig::default(),
        }
    }

    pub fn config(mut self, config: TextFolderConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the config and index the directory tree.
    pub fn build(self) -> Result<TextFolder> {
        self.config.validate()?;
        TextFolder::scan(self.root, &self.config)
    }
}

// TextFolder dataset

/// A directory-based text classification dataset.
#[derive(Debug, Clone)]
pub struct TextFolder {
    /// Class names in index order.
    class_names: Vec<String>,
    num_classes: usize,
    /// Per-sample metadata: (path, raw label).
    entries: Vec<(PathBuf, Option<usize>)>,
    max_length: Option<usize>,
}

impl TextFolder {
    /// Convenience entry-point: `TextFolder::new(root)` returns a builder.
    pub fn new<P: AsRef<Path>>(root: P) -> TextFolderBuilder {
        TextFolderBuilder::new(root)
    }

    /// Index `root` according to `config`.
    ///
    /// Assumes `config.validate()` already passed. When shuffling without a
    /// seed, a random seed is drawn for the initial file-list permutation.
    pub(crate) fn scan(root: PathBuf, config: &TextFolderConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }

        let seed = config
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..1_000_000));
        let index = index_directory(
            &root,
            config.effective_labels(),
            config.class_names.as_deref(),
            config.shuffle,
            seed,
            config.follow_links,
        )?;

        if index.is_empty() {
            return Err(Error::NoTextFiles(root));
        }

        if config.effective_label_mode() == Some(LabelMode::Binary) && index.num_classes != 2 {
            return Err(Error::config(format!(
                "When passing `label_mode=\"binary\"`, there must be exactly 2 class_names. \
                 Received: class_names={:?} ({} classes)",
                index.class_names, index.num_classes
            )));
        }

        let entries = match index.labels {
            Some(labels) => index
                .file_paths
                .into_iter()
                .zip(labels.into_iter().map(Some))
                .collect(),
            None => index.file_paths.into_iter().map(|p| (p, None)).collect(),
        };

        Ok(TextFolder {
            class_names: index.class_names,
            num_classes: index.num_classes,
            entries,
            max_length: config.max_length,
        })
    }

    /// All sample paths in dataset order.
    pub fn file_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(p, _)| p.as_path())
    }
}

impl Dataset for TextFolder {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn text(&self, index: usize) -> Result<String> {
        read_text(&self.entries[index].0, self.max_length)
    }

    fn target(&self, index: usize) -> Option<usize> {
        self.entries[index].1
    }

    fn path(&self, index: usize) -> &Path {
        &self.entries[index].0
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Labels;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn read_text_truncates_to_characters() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("t.txt");
        fs::write(&p, "héllo wörld").unwrap();
        assert_eq!(read_text(&p, Some(5)).unwrap(), "héllo");
        assert_eq!(read_text(&p, None).unwrap(), "héllo wörld");
        assert_eq!(read_text(&p, Some(100)).unwrap(), "héllo wörld");
    }

    #[test]
    fn read_text_missing_file() {
        let err = read_text(Path::new("/definitely/not/here.txt"), None).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = TempDir::new().unwrap();
        let err = TextFolder::new(dir.path().join("missing")).build().unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }

    #[test]
    fn empty_class_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("x")).unwrap();
        fs::write(dir.path().join("x").join("notes.md"), "skip").unwrap();
        let err = TextFolder::new(dir.path()).build().unwrap_err();
        assert!(matches!(err, Error::NoTextFiles(_)));
    }

    #[test]
    fn binary_needs_two_classes() {
        let dir = TempDir::new().unwrap();
        for c in ["x", "y", "z"] {
            fs::create_dir(dir.path().join(c)).unwrap();
            fs::write(dir.path().join(c).join("1.txt"), c).unwrap();
        }
        let cfg = TextFolderConfig::default().label_mode(Some(LabelMode::Binary));
        let err = TextFolder::new(dir.path()).config(cfg).build().unwrap_err();
        assert!(err.to_string().contains("there must be exactly 2"));

        // Labels disabled: binary mode is irrelevant.
        let cfg = TextFolderConfig::default()
            .labels(Labels::None)
            .label_mode(Some(LabelMode::Binary));
        let ds = TextFolder::new(dir.path()).config(cfg).build().unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.target(0), None);
    }

    #[test]
    fn samples_read_lazily() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("only")).unwrap();
        fs::write(dir.path().join("only").join("a.txt"), "abcdef").unwrap();
        let cfg = TextFolderConfig::default().max_length(3);
        let ds = TextFolder::new(dir.path()).config(cfg).build().unwrap();
        assert_eq!(ds.class_names(), &["only".to_string()]);
        assert_eq!(ds.text(0).unwrap(), "abc");
        assert_eq!(ds.target(0), Some(0));
    }
}
