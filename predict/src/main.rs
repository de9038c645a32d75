use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::panic;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use clap::Parser;
use log::LevelFilter;
use tense_sense::api::{ErrorResponse, PredictResponse};
use tense_sense::{ClassScore, Classification, InferenceError, InferenceService, LabelTable};

#[derive(Parser, Debug)]
#[command(about = "A program to classify the tense of sentences.")]
struct Args {
    /// The model file (JSON, optionally zstd-compressed with a .zst extension)
    #[arg(long)]
    model: PathBuf,

    /// A CSV file with the header `class,label` mapping class ids to labels
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Print one JSON response object per sentence
    #[arg(long)]
    json: bool,

    /// Also print the probability of every class
    #[arg(long)]
    scores: bool,

    /// Number of threads (0 classifies on the main thread)
    #[arg(long, default_value = "0")]
    n_threads: usize,

    /// Minimum number of sentences handed to each thread
    #[arg(long, default_value = "64")]
    mt_chunk_size: usize,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Sentences to classify. When omitted, sentences are read from stdin, one per line.
    sentences: Vec<String>,
}

type Scored = Result<(Classification, Vec<ClassScore>), InferenceError>;

fn format_result(result: Scored, args: &Args) -> Result<String, serde_json::Error> {
    if args.json {
        let value = match result {
            Ok((c, scores)) => {
                let mut value = serde_json::to_value(PredictResponse::from(c))?;
                if args.scores {
                    let probabilities: serde_json::Map<_, _> = scores
                        .into_iter()
                        .map(|s| (s.class.to_string(), s.probability.into()))
                        .collect();
                    value["probabilities"] = probabilities.into();
                }
                value
            }
            Err(e) => serde_json::to_value(ErrorResponse::from(&e))?,
        };
        return serde_json::to_string(&value);
    }
    Ok(match result {
        Ok((c, scores)) => {
            let mut line = format!("{}\t{}\t{:.4}", c.label, c.class, c.confidence);
            if args.scores {
                for s in scores {
                    line.push_str(&format!("\t{}={:.4}", s.class, s.probability));
                }
            }
            line
        }
        Err(e) => format!("ERROR\t{}", e),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
        .init();

    let labels = match &args.labels {
        Some(path) => LabelTable::open(path)?,
        None => LabelTable::default(),
    };

    log::info!("Loading model file...");
    let service = InferenceService::try_load(&args.model, labels)?;

    let sentences = if args.sentences.is_empty() {
        stdin().lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        args.sentences.clone()
    };

    log::info!("Start classification");
    let start = Instant::now();
    let results: Vec<Scored> = if args.n_threads == 0 {
        sentences
            .iter()
            .map(|s| service.classify_with_scores(s))
            .collect()
    } else {
        let chunk_size = args
            .mt_chunk_size
            .max(1)
            .max(sentences.len().div_ceil(args.n_threads));
        thread::scope(|scope| {
            let handles: Vec<_> = sentences
                .chunks(chunk_size)
                .map(|chunk| {
                    let service = &service;
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|s| service.classify_with_scores(s))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect()
        })
    };
    let duration = start.elapsed();

    let mut out = BufWriter::new(stdout().lock());
    for result in results {
        writeln!(out, "{}", format_result(result, &args)?)?;
    }
    out.flush()?;

    log::info!("Elapsed: {} [sec]", duration.as_secs_f64());
    log::info!(
        "Speed: {} [sentences/sec]",
        sentences.len() as f64 / duration.as_secs_f64()
    );

    Ok(())
}
