//! Evaluation CLI: rank query embeddings against a gallery and report Recall@K.

use clap::Parser;
use embeval::{
    eval::{dataset, recall, EvalSet},
    Config, FeatureMatrix,
};
use std::path::{Path, PathBuf};

/// Recall@K evaluation over embedding feature files.
#[derive(Parser, Debug)]
#[command(name = "eval")]
struct Args {
    /// Path to query features JSON (default: features.json).
    #[arg(long, default_value = "features.json")]
    features: PathBuf,

    /// Optional gallery features file; omitted = self-retrieval.
    #[arg(long)]
    gallery: Option<PathBuf>,

    /// Comma-separated rank values, e.g. 1,2,4,8 (overrides config).
    #[arg(long, value_delimiter = ',')]
    ranks: Option<Vec<usize>>,

    /// Pass/fail threshold on recall at the first rank (overrides config).
    #[arg(long)]
    min_recall: Option<f32>,

    /// Read feature files as raw little-endian f32 blobs of this row width.
    #[arg(long, requires = "labels")]
    raw_dim: Option<usize>,

    /// Label file for raw query features (one integer per line).
    #[arg(long, requires = "raw_dim")]
    labels: Option<PathBuf>,

    /// Label file for raw gallery features.
    #[arg(long, requires = "raw_dim")]
    gallery_labels: Option<PathBuf>,
}

/// Load one feature set, either JSON or a raw blob with a side label file.
fn load_set(
    path: &Path,
    raw_dim: Option<usize>,
    labels_path: Option<&Path>,
) -> anyhow::Result<(FeatureMatrix, Vec<i64>)> {
    match raw_dim {
        Some(dim) => {
            let labels_path = labels_path
                .ok_or_else(|| anyhow::anyhow!("--raw-dim requires a label file for {}", path.display()))?;
            Ok(dataset::load_raw(path, labels_path, dim)?)
        }
        None => Ok(EvalSet::load(path)?.into_parts()?),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = Config::load_or_default()?;

    let ranks = args.ranks.unwrap_or_else(|| config.eval.ranks.clone());
    let min_recall = args.min_recall.or(config.eval.min_recall);

    let (features, labels) = load_set(&args.features, args.raw_dim, args.labels.as_deref())?;
    log::info!(
        "Loaded {} query vectors ({} dims) from {}",
        features.rows(),
        features.dim(),
        args.features.display()
    );

    println!("Running evaluation on {} queries\n", features.rows());

    let values = match &args.gallery {
        Some(path) => {
            let (gallery, gallery_labels) =
                load_set(path, args.raw_dim, args.gallery_labels.as_deref())?;
            log::info!("Loaded {} gallery vectors from {}", gallery.rows(), path.display());
            recall(&features, &labels, &ranks, Some(&gallery), Some(&gallery_labels))?
        }
        None => recall(&features, &labels, &ranks, None, None)?,
    };

    println!("=== Evaluation Results ===");
    for (r, value) in ranks.iter().zip(values.iter()) {
        println!("Recall@{}: {:.2}%", r, value * 100.0);
    }

    if let Some(threshold) = min_recall {
        let top = values[0];
        if top >= threshold {
            println!(
                "\nRecall@{} passes threshold ({:.2}% >= {:.2}%).",
                ranks[0],
                top * 100.0,
                threshold * 100.0
            );
        } else {
            println!(
                "\nRecall@{} below threshold ({:.2}% < {:.2}%).",
                ranks[0],
                top * 100.0,
                threshold * 100.0
            );
            std::process::exit(1);
        }
    }

    Ok(())
}
