// Directory indexing: class inference, file listing and label alignment
//
// With inferred labels the class directories are the sorted subdirectories of
// the root, and every text file at any depth below a class directory belongs
// to that class:
//
//   root/
//     class_a/
//       a_1.txt
//       subfolder/
//         a_2.txt        -> class_a
//     class_b/
//       b_1.txt
//     stray.txt          -> ignored
//
// Without inferred labels the root itself is walked, so `stray.txt` counts.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Labels;
use crate::error::{Error, Result};

/// Allowed sample extensions (case-insensitive).
pub const EXTENSIONS: &[&str] = &["txt"];

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Result of indexing a directory.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    /// Sample paths, in discovery order (or shuffled).
    pub file_paths: Vec<PathBuf>,
    /// Raw label per sample, aligned with `file_paths`. `None` when labels
    /// are disabled.
    pub labels: Option<Vec<usize>>,
    /// Class names in index order. Empty unless labels are inferred.
    pub class_names: Vec<String>,
    /// Number of distinct label values.
    pub num_classes: usize,
}

impl DirectoryIndex {
    pub fn len(&self) -> usize {
        self.file_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_paths.is_empty()
    }
}

/// Sorted names of the subdirectories of `root`.
///
/// Symlinks to directories are classes only when `follow_links` is set.
fn class_directories(root: &Path, follow_links: bool) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let rd = std::fs::read_dir(root).map_err(|e| Error::io(root, e))?;
    for entry in rd {
        let entry = entry.map_err(|e| Error::io(root, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_symlink() && !follow_links {
            if path.is_dir() {
                debug!("skipping symlinked directory {:?}", path);
            }
            continue;
        }
        if path.is_dir() {
            match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => names.push(name.to_string()),
                None => warn!("skipping non UTF-8 directory name {:?}", path),
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Recursively list text files below `dir`.
///
/// Files are ordered by their parent directory first and by file name within
/// a directory, so the result does not depend on the filesystem's listing
/// order. Unreadable entries below `dir` are skipped with a warning; failing
/// to read `dir` itself is an error.
pub fn list_text_files(dir: &Path, follow_links: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(follow_links) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() > 0 => {
                warn!("skipping unreadable entry under {:?}: {}", dir, e);
                continue;
            }
            Err(e) => return Err(Error::Walk(e)),
        };
        let path = entry.path();
        // Symlinked files are samples even when links are not followed.
        let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && path.is_file());
        if is_file && is_text_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort_by(|a, b| (a.parent(), a.file_name()).cmp(&(b.parent(), b.file_name())));
    Ok(files)
}

/// Index `root` into sample paths and labels.
///
/// `seed` drives the shuffle when `shuffle` is set; the same seed on the same
/// directory always produces the same order.
pub fn index_directory(
    root: &Path,
    labels: &Labels,
    class_names: Option<&[String]>,
    shuffle: bool,
    seed: u64,
    follow_links: bool,
) -> Result<DirectoryIndex> {
    let (mut file_paths, mut raw_labels, class_names, num_classes) = match labels {
        Labels::Inferred => {
            let subdirs = class_directories(root, follow_links)?;
            let classes = match class_names {
                Some(given) => {
                    let expected: BTreeSet<&str> = subdirs.iter().map(String::as_str).collect();
                    let received: BTreeSet<&str> = given.iter().map(String::as_str).collect();
                    if expected != received || given.len() != subdirs.len() {
                        return Err(Error::config(format!(
                            "The `class_names` passed did not match the names of the \
                             subdirectories of the target directory. Expected: {subdirs:?}, \
                             but received: {given:?}"
                        )));
                    }
                    given.to_vec()
                }
                None => subdirs,
            };

            let per_class: Vec<Vec<PathBuf>> = classes
                .par_iter()
                .map(|name| list_text_files(&root.join(name), follow_links))
                .collect::<Result<_>>()?;

            let mut paths = Vec::new();
            let mut targets = Vec::new();
            for (class_idx, files) in per_class.into_iter().enumerate() {
                let name = &classes[class_idx];
                debug!("class {:?} (label {}): {} files", name, class_idx, files.len());
                targets.extend(std::iter::repeat(class_idx).take(files.len()));
                paths.extend(files);
            }
            let k = classes.len();
            (paths, Some(targets), classes, k)
        }
        Labels::Explicit(given) => {
            let paths = list_text_files(root, follow_links)?;
            if given.len() != paths.len() {
                return Err(Error::config(format!(
                    "Expected the lengths of `labels` to match the number of files in the \
                     target directory. len(labels) is {} while we found {} files in {}.",
                    given.len(),
                    paths.len(),
                    root.display()
                )));
            }
            let k = given.iter().max().map_or(0, |&m| m + 1);
            (paths, Some(given.clone()), Vec::new(), k)
        }
        Labels::None => (list_text_files(root, follow_links)?, None, Vec::new(), 0),
    };

    info!(
        "Found {} files belonging to {} classes in {:?}",
        file_paths.len(),
        num_classes,
        root
    );

    if shuffle {
        let mut order: Vec<usize> = (0..file_paths.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        file_paths = order.iter().map(|&i| file_paths[i].clone()).collect();
        if let Some(targets) = raw_labels.take() {
            raw_labels = Some(order.iter().map(|&i| targets[i]).collect());
        }
    }

    Ok(DirectoryIndex {
        file_paths,
        labels: raw_labels,
        class_names,
        num_classes,
    })
}
