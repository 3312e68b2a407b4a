// =============================================================================
// textfolder: inspect a directory of text files as a classification dataset
// =============================================================================
//
// Builds the same loader a training loop would use, traverses it once and
// prints what it yields: class names, sample count and the shape of every
// batch.
//
// Usage:
//   textfolder data/reviews                                  # int labels, batches of 32
//   textfolder data/reviews --label-mode categorical -b 8
//   textfolder data/reviews --validation-split 0.2 --subset validation --seed 1337
//   textfolder data/reviews --labels none --follow-links
//   RUST_LOG=debug textfolder data/reviews                   # per-class counts

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use textfolder::{
    text_dataset_from_directory, Element, LabelMode, Labels, Subset, TextFolderConfig,
};

#[derive(Parser, Debug)]
#[command(name = "textfolder", version, about = "Inspect a text classification directory")]
struct Args {
    /// Root directory; each subdirectory is a class.
    directory: PathBuf,

    /// Samples per batch (0 = unbatched, one sample at a time).
    #[arg(short, long, default_value_t = 32)]
    batch_size: usize,

    /// Label source: "inferred" or "none".
    #[arg(long, default_value = "inferred")]
    labels: String,

    /// Label encoding: int, binary, categorical or none.
    #[arg(long, default_value = "int")]
    label_mode: String,

    /// Comma-separated class order (must match the subdirectories).
    #[arg(long, value_delimiter = ',')]
    class_names: Option<Vec<String>>,

    /// Fraction of samples reserved for validation.
    #[arg(long)]
    validation_split: Option<f64>,

    /// "training" or "validation".
    #[arg(long)]
    subset: Option<String>,

    /// Seed for shuffling and splitting.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep discovery order.
    #[arg(long)]
    no_shuffle: bool,

    /// Traverse symlinked directories.
    #[arg(long)]
    follow_links: bool,

    /// Truncate texts to this many characters.
    #[arg(long)]
    max_length: Option<usize>,

    /// 0 = sequential reads, >0 = parallel reads on the rayon pool.
    #[arg(long, default_value_t = 0)]
    num_workers: usize,
}

impl Args {
    fn to_config(&self) -> Result<TextFolderConfig> {
        let labels: Labels = self.labels.parse()?;
        let label_mode: Option<LabelMode> = LabelMode::parse_optional(&self.label_mode)?;
        let subset = self
            .subset
            .as_deref()
            .map(str::parse::<Subset>)
            .transpose()?;

        Ok(TextFolderConfig {
            labels,
            label_mode,
            class_names: self.class_names.clone(),
            batch_size: (self.batch_size > 0).then_some(self.batch_size),
            max_length: self.max_length,
            shuffle: !self.no_shuffle,
            seed: self.seed,
            validation_split: self.validation_split,
            subset,
            follow_links: self.follow_links,
            num_workers: self.num_workers,
        })
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.to_config()?;
    let mut ds = text_dataset_from_directory(&args.directory, config)
        .with_context(|| format!("loading {}", args.directory.display()))?;

    println!("Classes ({}): {:?}", ds.num_classes(), ds.class_names());
    println!("Samples: {}", ds.len());
    println!("Batches: {}", ds.num_batches());

    for (i, element) in ds.iter().enumerate() {
        match element? {
            Element::Batch(batch) => match &batch.labels {
                Some(labels) => println!(
                    "  batch {i:>4}: text {:?}, labels {:?} {}",
                    batch.text_shape(),
                    labels.shape(),
                    labels.dtype()
                ),
                None => println!("  batch {i:>4}: text {:?}", batch.text_shape()),
            },
            Element::Single(sample) => {
                let chars = sample.text.chars().count();
                match &sample.label {
                    Some(label) => println!("  sample {i:>4}: {chars} chars, label {label:?}"),
                    None => println!("  sample {i:>4}: {chars} chars"),
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
