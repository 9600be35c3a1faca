//! Turning a directory of labeled text files into token pools
//!
//! Layout: one subdirectory per class, one file per document.
//! Reading failures are reported per document, never as an empty token list.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    vectorizer::corpus::TokenPool,
};

/// Class label -> document paths
pub type DocumentPaths = IndexMap<String, Vec<PathBuf>>;

/// alphabetic runs and numbers (with an optional fraction)
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z]+|[0-9]+(\.[0-9]+)?)").expect("Valid token regex")
});

/// Lowercasing, punctuation-stripping tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    /// tokens must be longer than this many chars
    pub min_len: usize,
    /// drop ASCII digits before splitting
    pub remove_numerics: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            min_len: 0,
            remove_numerics: true,
        }
    }
}

impl Tokenizer {
    pub fn new(min_len: usize, remove_numerics: bool) -> Self {
        Self {
            min_len,
            remove_numerics,
        }
    }

    /// Split a text into tokens
    ///
    /// Letters and numbers are separated from their neighbours, then ASCII
    /// punctuation (and digits when `remove_numerics`) is deleted.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let spaced = TOKEN_PATTERN.replace_all(&lowered, " ${1} ");
        let cleaned: String = spaced
            .chars()
            .filter(|c| !(c.is_ascii_punctuation() || (self.remove_numerics && c.is_ascii_digit())))
            .collect();
        cleaned
            .split_whitespace()
            .filter(|word| word.chars().count() > self.min_len)
            .map(str::to_string)
            .collect()
    }

    /// Read and tokenize one document
    /// Invalid UTF-8 is replaced, not rejected.
    pub fn tokenize_file<P>(&self, path: P) -> Result<Vec<String>>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::Document {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.tokenize(&String::from_utf8_lossy(&bytes)))
    }
}

/// Every subdirectory of `root` is a class, every file in it a document
/// Classes and documents are sorted by name.
pub fn scan_classes<P>(root: P) -> Result<DocumentPaths>
where
    P: AsRef<Path>,
{
    let mut class_dirs = Vec::new();
    for entry in fs::read_dir(root.as_ref())? {
        let path = entry?.path();
        if path.is_dir() {
            class_dirs.push(path);
        }
    }
    class_dirs.sort();

    let mut paths = DocumentPaths::with_capacity(class_dirs.len());
    for dir in class_dirs {
        let Some(label) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        debug!(class = %label, documents = files.len(), "class scanned");
        paths.insert(label, files);
    }
    Ok(paths)
}

/// Per class, the first `floor(ratio * n)` documents train and the rest test
pub fn train_test_split(ratio: f64, paths: &DocumentPaths) -> Result<(DocumentPaths, DocumentPaths)> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(Error::InvalidRatio(ratio));
    }
    let mut train = DocumentPaths::with_capacity(paths.len());
    let mut test = DocumentPaths::with_capacity(paths.len());
    for (class, files) in paths {
        let train_cnt = ((ratio * files.len() as f64).floor() as usize).min(files.len());
        let (head, tail) = files.split_at(train_cnt);
        train.insert(class.clone(), head.to_vec());
        test.insert(class.clone(), tail.to_vec());
    }
    Ok((train, test))
}

/// Token pool built from document paths
#[derive(Debug)]
pub struct PoolLoad {
    /// successfully tokenized documents, in path order
    pub pool: TokenPool,
    /// `Error::Document` for each document that could not be read
    pub failures: Vec<Error>,
}

impl PoolLoad {
    pub fn doc_num(&self) -> usize {
        self.pool.values().map(Vec::len).sum()
    }
}

/// Tokenize every document, in parallel within each class
pub fn tokenize_paths(paths: &DocumentPaths, tokenizer: &Tokenizer) -> PoolLoad {
    let mut pool = TokenPool::with_capacity(paths.len());
    let mut failures = Vec::new();
    for (class, files) in paths {
        let results: Vec<Result<Vec<String>>> = files
            .par_iter()
            .map(|path| tokenizer.tokenize_file(path))
            .collect();
        let mut docs = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(tokens) => docs.push(tokens),
                Err(err) => {
                    warn!(class = %class, "{err}");
                    failures.push(err);
                }
            }
        }
        pool.insert(class.clone(), docs);
    }
    PoolLoad { pool, failures }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_strips() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("Hello, World!\nIt's 3.14 o'clock in R2D2-land.");
        assert_eq!(
            tokens,
            vec!["hello", "world", "it", "s", "o", "clock", "in", "r", "d", "land"]
        );
    }

    #[test]
    fn tokenize_keeps_numbers_when_asked() {
        let tokenizer = Tokenizer::new(0, false);
        let tokens = tokenizer.tokenize("pi is 3.14, e is 2");
        // the decimal point is punctuation and is stripped
        assert_eq!(tokens, vec!["pi", "is", "314", "e", "is", "2"]);
    }

    #[test]
    fn tokenize_min_len_filters_short_words() {
        let tokenizer = Tokenizer::new(2, true);
        assert_eq!(tokenizer.tokenize("a an the cats"), vec!["the", "cats"]);
    }

    #[test]
    fn split_uses_floor_of_ratio() {
        let mut paths = DocumentPaths::new();
        paths.insert("A".into(), (0..4).map(|i| PathBuf::from(format!("a{i}"))).collect());
        paths.insert("B".into(), vec![PathBuf::from("b0")]);
        let (train, test) = train_test_split(0.75, &paths).unwrap();
        assert_eq!(train["A"].len(), 3);
        assert_eq!(test["A"], vec![PathBuf::from("a3")]);
        assert!(train["B"].is_empty());
        assert_eq!(test["B"].len(), 1);
        assert!(matches!(train_test_split(1.5, &paths), Err(Error::InvalidRatio(_))));
    }

    #[test]
    fn scan_and_tokenize_directory() {
        let dir = tempfile::tempdir().unwrap();
        for (class, docs) in [("sci", vec!["Space rockets!", "Orbit"]), ("rec", vec!["Hockey game"])] {
            let class_dir = dir.path().join(class);
            fs::create_dir(&class_dir).unwrap();
            for (i, text) in docs.iter().enumerate() {
                fs::write(class_dir.join(format!("{i}.txt")), text).unwrap();
            }
        }
        fs::write(dir.path().join("README"), "not a class").unwrap();

        let paths = scan_classes(dir.path()).unwrap();
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["rec", "sci"]);
        assert_eq!(paths["sci"].len(), 2);

        let mut with_missing = paths.clone();
        with_missing["rec"].push(dir.path().join("rec").join("missing.txt"));
        let load = tokenize_paths(&with_missing, &Tokenizer::default());
        assert_eq!(load.pool["sci"], vec![vec!["space", "rockets"], vec!["orbit"]]);
        assert_eq!(load.pool["rec"], vec![vec!["hockey", "game"]]);
        assert_eq!(load.doc_num(), 3);
        assert_eq!(load.failures.len(), 1);
        assert!(matches!(load.failures[0], Error::Document { .. }));
    }
}
