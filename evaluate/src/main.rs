use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use tense_sense::{InferenceService, LabelTable};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of a tense model.")]
struct Args {
    /// The model file (JSON, optionally zstd-compressed with a .zst extension)
    #[arg(long)]
    model: PathBuf,

    /// A labelled CSV dataset
    #[arg(long)]
    dataset: PathBuf,

    /// A CSV file with the header `class,label` mapping class ids to labels
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Name of the column holding sentences
    #[arg(long, default_value = "Sentence")]
    sentence_column: String,

    /// Name of the column holding class ids
    #[arg(long, default_value = "Label")]
    label_column: String,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// Datasets are read as ISO-8859-1, the encoding the model was trained on, even when the bytes
// happen to be valid UTF-8.
fn decode_field(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn column_index(headers: &csv::ByteRecord, name: &str) -> Result<usize, String> {
    headers
        .iter()
        .position(|h| decode_field(h).trim() == name)
        .ok_or_else(|| format!("column {:?} not found in the dataset", name))
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
    let classes = service
        .model()
        .map(|m| m.classes().to_vec())
        .unwrap_or_default();

    log::info!("Loading dataset...");
    let mut rdr = csv::Reader::from_reader(File::open(&args.dataset)?);
    let headers = rdr.byte_headers()?.clone();
    let sentence_idx = column_index(&headers, &args.sentence_column)?;
    let label_idx = column_index(&headers, &args.label_column)?;

    log::info!("Start classification");
    // confusion[reference][hypothesis], indexed by position in `classes`
    let n_classes = classes.len();
    let mut confusion = vec![vec![0usize; n_classes]; n_classes];
    let mut n_unknown_reference = 0;
    let mut n_skipped = 0;
    for record in rdr.byte_records() {
        let record = record?;
        let sentence = decode_field(record.get(sentence_idx).unwrap_or_default());
        let reference: i64 = decode_field(record.get(label_idx).unwrap_or_default())
            .trim()
            .parse()?;
        let c = match service.classify(&sentence) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", sentence, e);
                n_skipped += 1;
                continue;
            }
        };
        let Some(r) = classes.iter().position(|&cls| cls == reference) else {
            n_unknown_reference += 1;
            continue;
        };
        let h = classes
            .iter()
            .position(|&cls| cls == c.class)
            .ok_or("predicted class is not part of the model")?;
        confusion[r][h] += 1;
    }

    let n_total: usize = confusion.iter().flatten().sum::<usize>() + n_unknown_reference;
    let n_correct: usize = (0..n_classes).map(|i| confusion[i][i]).sum();
    println!(
        "Accuracy: {} ({}/{})",
        n_correct as f64 / n_total as f64,
        n_correct,
        n_total
    );
    if n_skipped != 0 {
        println!("Skipped: {}", n_skipped);
    }
    for (i, &cls) in classes.iter().enumerate() {
        let n_tp = confusion[i][i];
        let n_sys: usize = confusion.iter().map(|row| row[i]).sum();
        let n_ref: usize = confusion[i].iter().sum();
        let precision = n_tp as f64 / n_sys as f64;
        let recall = n_tp as f64 / n_ref as f64;
        let f1 = 2. * precision * recall / (precision + recall);
        println!(
            "{} ({}): Precision: {}, Recall: {}, F1: {}",
            service.labels().label(cls),
            cls,
            precision,
            recall,
            f1
        );
    }
    println!("Confusion matrix (rows: reference, columns: prediction):");
    println!(
        "\t{}",
        classes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("\t")
    );
    for (cls, row) in classes.iter().zip(&confusion) {
        println!(
            "{}\t{}",
            cls,
            row.iter().map(|n| n.to_string()).collect::<Vec<_>>().join("\t")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_field_latin1() {
        assert_eq!("caf\u{e9}", decode_field(b"caf\xe9"));
    }

    #[test]
    fn test_decode_field_utf8_bytes_as_latin1() {
        assert_eq!("caf\u{c3}\u{a9}", decode_field("café".as_bytes()));
    }

    #[test]
    fn test_column_index() {
        let headers = csv::ByteRecord::from(vec!["Sentence", " Label "]);
        assert_eq!(Ok(0), column_index(&headers, "Sentence"));
        assert_eq!(Ok(1), column_index(&headers, "Label"));
        assert!(column_index(&headers, "Text").is_err());
    }
}
