use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use tense_sense::{Model, StopWords};

#[derive(Parser, Debug)]
#[command(about = "A program to inspect and re-export exported models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file (compressed with zstd if it ends with .zst)
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output the vocabulary with its idf and per-class weights as CSV
    #[arg(long)]
    dump_vocab: Option<PathBuf>,

    /// Print a summary of the model
    #[arg(long)]
    info: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn print_info(model: &Model) {
    let params = model.params();
    let range = model.ngram_range();
    println!("Features: {}", model.n_features());
    println!("Classes: {:?}", model.classes());
    println!("Intercept: {:?}", model.intercept());
    println!("N-gram range: ({}, {})", range.min, range.max);
    println!("Sublinear TF: {}", params.sublinear_tf);
    match params.norm {
        Some(norm) => println!("Norm: {:?}", norm),
        None => println!("Norm: none"),
    }
    if let Some(StopWords::List(words)) = &params.stop_words {
        println!("Stop words: {}", words.len());
    }
    for (key, value) in &params.extra {
        println!("{}: {}", key, value);
    }
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

    log::info!("Loading model file...");
    let model = Model::open(&args.model_in)?;

    if args.info {
        print_info(&model);
    }

    if let Some(path) = args.dump_vocab {
        log::info!("Saving vocabulary file...");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        let mut header = vec!["ngram".to_string(), "index".to_string(), "idf".to_string()];
        header.extend(model.classes().iter().map(|c| format!("coef_{}", c)));
        wtr.write_record(&header)?;
        for term in model.terms() {
            let mut record = vec![
                term.ngram.to_string(),
                term.index.to_string(),
                term.idf.to_string(),
            ];
            record.extend(term.weights.iter().map(|w| w.to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.model_out {
        log::info!("Saving model file...");
        model.save(path)?;
    }

    Ok(())
}
