use std::{path::PathBuf, time::Instant};

use anyhow::{bail, Context as _};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rocchio_classifier::{
    build_vocabulary, calculate_metrics,
    dataset::{scan_classes, tokenize_paths, train_test_split, Tokenizer},
    save_vocabulary, ClassFrequencyEngine, Evaluation, RawFrequencyEngine, Rocchio, TokenPool,
    WeightingEngine,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    /// ln(class terms / term's class count) on training vectors
    ClassFrequency,
    /// plain term frequency
    Raw,
}

/// Train a Rocchio classifier on a directory of labeled documents and
/// report precision / recall on the held-out split
#[derive(Debug, Parser)]
#[command(name = "rocchio", version)]
struct Args {
    /// Directory with one subdirectory per class
    #[arg(long, env = "ROCCHIO_DATA")]
    data: PathBuf,
    /// Share of each class used for training
    #[arg(long, default_value_t = 0.75)]
    ratio: f64,
    /// Tokens must be longer than this
    #[arg(long, default_value_t = 0)]
    min_len: usize,
    /// Keep numeric tokens
    #[arg(long)]
    keep_numerics: bool,
    #[arg(long, value_enum, default_value_t = Engine::ClassFrequency)]
    engine: Engine,
    /// Write the vocabulary as CSV
    #[arg(long)]
    save_vocabulary: Option<PathBuf>,
    /// Write the trained model as CBOR
    #[arg(long)]
    save_model: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let program_start = Instant::now();

    match args.engine {
        Engine::ClassFrequency => run::<ClassFrequencyEngine>(&args)?,
        Engine::Raw => run::<RawFrequencyEngine>(&args)?,
    }

    info!(
        elapsed_ms = program_start.elapsed().as_secs_f64() * 1000.0,
        "done"
    );
    Ok(())
}

fn run<E>(args: &Args) -> anyhow::Result<()>
where
    E: WeightingEngine + Send + Sync,
{
    let files = scan_classes(&args.data)
        .with_context(|| format!("failed to scan {}", args.data.display()))?;
    if files.is_empty() {
        bail!("no class directories in {}", args.data.display());
    }
    let class_titles: Vec<String> = files.keys().cloned().collect();
    let (train, test) = train_test_split(args.ratio, &files)?;

    let tokenizer = Tokenizer::new(args.min_len, !args.keep_numerics);
    let train_pool = load_pool("train", &train, &tokenizer);
    let test_pool = load_pool("test", &test, &tokenizer);

    let vocabulary = build_vocabulary(&class_titles, &train_pool);
    info!(terms = vocabulary.len(), "vocabulary built");
    if let Some(path) = &args.save_vocabulary {
        save_vocabulary(&vocabulary, path)
            .with_context(|| format!("failed to save vocabulary to {}", path.display()))?;
    }

    let mut rocchio: Rocchio<E> = Rocchio::new(&class_titles, vocabulary);
    rocchio.train(&train_pool).context("training failed")?;
    for (label, distance) in rocchio.centroid_distances()? {
        info!(class = %label, distance, "centroid distance to first class");
    }
    if let Some(path) = &args.save_model {
        rocchio
            .save_model(path)
            .with_context(|| format!("failed to save model to {}", path.display()))?;
    }

    let label_pool = rocchio.predict_pool(&test_pool)?;
    let evaluation = calculate_metrics(&class_titles, &label_pool)?;
    report(&evaluation);
    Ok(())
}

fn load_pool(
    split: &str,
    paths: &rocchio_classifier::dataset::DocumentPaths,
    tokenizer: &Tokenizer,
) -> TokenPool {
    let start = Instant::now();
    let load = tokenize_paths(paths, tokenizer);
    if !load.failures.is_empty() {
        warn!(split, failed = load.failures.len(), "some documents could not be read");
    }
    info!(
        split,
        documents = load.doc_num(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "documents tokenized"
    );
    load.pool
}

fn report(evaluation: &Evaluation) {
    println!("{evaluation}");
    if let Err(err) = evaluation.macro_f1() {
        warn!("{err}");
    }
}
