//! CSV persistence of a `Vocabulary`
//!
//! One record per term, no header:
//! `term,index[,class:count]*`
//! Only classes with a nonzero count are written.

use std::{collections::HashSet, fs::File, io, path::Path};

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    vectorizer::corpus::{TermEntry, Vocabulary},
};

/// Result of loading a persisted vocabulary
/// Malformed records are skipped and reported here instead of aborting the load
#[derive(Debug)]
pub struct VocabularyLoad {
    pub vocabulary: Vocabulary,
    /// `Error::MalformedRecord` for every skipped record
    pub skipped: Vec<Error>,
}

pub fn write_vocabulary<W>(vocabulary: &Vocabulary, writer: W) -> Result<()>
where
    W: io::Write,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);
    for (term, entry) in vocabulary.iter() {
        let mut row = Vec::with_capacity(2 + entry.class_counts.len());
        row.push(term.to_string());
        row.push(entry.index.to_string());
        for (class, count) in entry.class_counts.iter() {
            if *count > 0 {
                row.push(format!("{class}:{count}"));
            }
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_vocabulary<R>(reader: R) -> Result<VocabularyLoad>
where
    R: io::Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut vocabulary = Vocabulary::new();
    let mut claimed_indices = HashSet::new();
    let mut skipped = Vec::new();

    // index は `0..レコード数` に収まる必要がある
    let records: Vec<csv::Result<csv::StringRecord>> = rdr.records().collect();
    let index_bound = records.len();

    for (i, record) in records.into_iter().enumerate() {
        let record_num = i as u64 + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped.push(malformed(record_num, e.to_string()));
                continue;
            }
        };
        let parsed = parse_record(&record, index_bound).and_then(|(term, entry)| {
            if vocabulary.contains_term(&term) {
                Err(format!("duplicate term `{term}`"))
            } else if !claimed_indices.insert(entry.index) {
                Err(format!("index {} already used", entry.index))
            } else {
                Ok((term, entry))
            }
        });
        match parsed {
            Ok((term, entry)) => vocabulary.insert_entry(&term, entry),
            Err(reason) => skipped.push(malformed(record_num, reason)),
        }
    }

    for err in &skipped {
        warn!("skipped vocabulary record: {err}");
    }
    Ok(VocabularyLoad {
        vocabulary,
        skipped,
    })
}

/// Write the vocabulary to a CSV file
pub fn save_vocabulary<P>(vocabulary: &Vocabulary, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path)?;
    write_vocabulary(vocabulary, file)?;
    info!(terms = vocabulary.len(), path = %path.display(), "vocabulary saved");
    Ok(())
}

/// Read a vocabulary CSV file, skipping malformed records
pub fn load_vocabulary<P>(path: P) -> Result<VocabularyLoad>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let load = read_vocabulary(File::open(path)?)?;
    info!(
        terms = load.vocabulary.len(),
        skipped = load.skipped.len(),
        path = %path.display(),
        "vocabulary loaded"
    );
    Ok(load)
}

fn malformed(record: u64, reason: String) -> Error {
    Error::MalformedRecord { record, reason }
}

fn parse_record(
    record: &csv::StringRecord,
    index_bound: usize,
) -> std::result::Result<(String, TermEntry), String> {
    if record.len() < 2 {
        return Err(format!("expected at least 2 fields, found {}", record.len()));
    }
    let term = record[0].to_string();
    let index = record[1]
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid index `{}`: {e}", &record[1]))?;
    if index >= index_bound {
        return Err(format!("index {index} out of range for {index_bound} records"));
    }
    let mut entry = TermEntry::new(index);
    for field in record.iter().skip(2) {
        // ラベルに ':' を含んでもいいように最後の ':' で分割
        let (class, count) = field
            .rsplit_once(':')
            .ok_or_else(|| format!("class field `{field}` has no `:`"))?;
        let count = count
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("invalid count in `{field}`: {e}"))?;
        if entry.class_counts.contains_key(class) {
            return Err(format!("class `{class}` listed twice"));
        }
        if count > 0 {
            entry.class_counts.insert(class.to_string(), count);
        }
    }
    Ok((term, entry))
}
