
// imports
use crate::error::AlignError;
use crate::preprocess::Preprocessor;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

// interning table between word strings and dense ids. Ids index the rows
// and columns of the alignment matrix and the flat count buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocab {
    token2id: HashMap<String, usize>,
    id2token: Vec<String>,
}

impl Vocab {

    pub fn new() -> Vocab {
        Self::default()
    }

    pub fn intern(&mut self, token: &str) -> usize {
        match self.token2id.get(token) {
            Some(&id) => id,
            None => {
                let id = self.id2token.len();
                self.token2id.insert(token.to_owned(), id);
                self.id2token.push(token.to_owned());
                id
            }
        }
    }

    pub fn id(&self, token: &str) -> Option<usize> {
        self.token2id.get(token).copied()
    }

    pub fn token(&self, id: usize) -> &str {
        &self.id2token[id]
    }

    pub fn len(&self) -> usize {
        self.id2token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2token.is_empty()
    }
}

// an ordered, index-aligned pair of token-sequence lists. Line i of the
// source side corresponds to line i of the target side, both bracketed by
// the sentence boundary sentinels.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelCorpus {
    pub source: Vec<Vec<usize>>,
    pub target: Vec<Vec<usize>>,
    pub source_vocab: Vocab,
    pub target_vocab: Vocab,
}

impl ParallelCorpus {

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    // reads up to `num_sentences` aligned pairs from `train_dir`. Files of
    // the two languages share a base name and differ only in the trailing
    // language suffix (fubar.e / fubar.f). Every raw line passes through
    // the preprocessor before whitespace tokenization and interning.
    //
    // the directory is scanned exactly once, in sorted name order. If it
    // holds fewer aligned pairs than requested this fails with
    // CorpusExhausted instead of re-scanning forever.
    pub fn read_parallel(
        train_dir: &str,
        num_sentences: usize,
        source_suffix: &str,
        target_suffix: &str,
    ) -> Result<ParallelCorpus, AlignError> {

        let source_pp = Preprocessor::new(source_suffix);
        let target_pp = Preprocessor::new(target_suffix);

        let mut corpus = ParallelCorpus {
            source: Vec::new(),
            target: Vec::new(),
            source_vocab: Vocab::new(),
            target_vocab: Vocab::new(),
        };

        // sorted for a deterministic sentence order across runs
        let mut paths: Vec<PathBuf> = fs::read_dir(train_dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        for path in paths {
            if corpus.len() == num_sentences {
                break;
            }

            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            let base = match name.strip_suffix(source_suffix) {
                Some(base) => base,
                None => continue,
            };

            let twin = path.with_file_name(format!("{}{}", base, target_suffix));
            if !twin.exists() {
                return Err(AlignError::MissingTargetFile(path));
            }

            let source_lines = read_lines(&path)?;
            let target_lines = read_lines(&twin)?;

            for (source_line, target_line) in source_lines.iter().zip(target_lines.iter()) {
                if corpus.len() == num_sentences {
                    break;
                }
                corpus.push_pair(
                    &source_pp.preprocess(source_line),
                    &target_pp.preprocess(target_line),
                );
            }
        }

        if corpus.len() < num_sentences {
            return Err(AlignError::CorpusExhausted {
                requested: num_sentences,
                available: corpus.len(),
            });
        }

        Ok(corpus)
    }

    // builds a corpus from already-preprocessed lines of whitespace
    // separated tokens, index-aligned between the two slices
    pub fn from_lines(source_lines: &[&str], target_lines: &[&str]) -> ParallelCorpus {

        assert_eq!(source_lines.len(), target_lines.len());

        let mut corpus = ParallelCorpus {
            source: Vec::new(),
            target: Vec::new(),
            source_vocab: Vocab::new(),
            target_vocab: Vocab::new(),
        };
        for (source_line, target_line) in source_lines.iter().zip(target_lines.iter()) {
            corpus.push_pair(source_line, target_line);
        }
        corpus
    }

    fn push_pair(&mut self, source_line: &str, target_line: &str) {

        let source_sentence = source_line
            .split(' ')
            .map(|tok| self.source_vocab.intern(tok))
            .collect();
        let target_sentence = target_line
            .split(' ')
            .map(|tok| self.target_vocab.intern(tok))
            .collect();
        self.source.push(source_sentence);
        self.target.push(target_sentence);
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, AlignError> {

    let f = File::open(path).map_err(|e| AlignError::FileRead {
        path: path.to_owned(),
        source: e,
    })?;
    let lines = BufReader::new(f)
        .lines()
        .collect::<Result<Vec<String>, _>>()?;
    Ok(lines)
}


#[cfg(test)]
mod tests {

    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, lines: &[&str]) {
        let mut f = File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(f, "{}", line).unwrap();
        }
    }

    #[test]
    fn read_parallel_test() {

        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "toy.e", &["The dog.", "A house"]);
        write_file(dir.path(), "toy.f", &["Le chien.", "Une maison"]);

        let corpus =
            ParallelCorpus::read_parallel(dir.path().to_str().unwrap(), 2, "e", "f").unwrap();

        assert_eq!(corpus.len(), 2);
        let first_source: Vec<&str> = corpus.source[0]
            .iter()
            .map(|&id| corpus.source_vocab.token(id))
            .collect();
        assert_eq!(first_source, ["SENTSTART", "the", "dog", ".", "SENTEND"]);
        let second_target: Vec<&str> = corpus.target[1]
            .iter()
            .map(|&id| corpus.target_vocab.token(id))
            .collect();
        assert_eq!(second_target, ["SENTSTART", "une", "maison", "SENTEND"]);
    }

    #[test]
    fn sentence_cap_test() {

        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "toy.e", &["one", "two", "three"]);
        write_file(dir.path(), "toy.f", &["un", "deux", "trois"]);

        let corpus =
            ParallelCorpus::read_parallel(dir.path().to_str().unwrap(), 2, "e", "f").unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn corpus_exhausted_test() {

        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "toy.e", &["The dog."]);
        write_file(dir.path(), "toy.f", &["Le chien."]);

        let err = ParallelCorpus::read_parallel(dir.path().to_str().unwrap(), 5, "e", "f")
            .unwrap_err();
        match err {
            AlignError::CorpusExhausted {
                requested,
                available,
            } => {
                assert_eq!(requested, 5);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn missing_twin_test() {

        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "solo.e", &["The dog."]);

        let err = ParallelCorpus::read_parallel(dir.path().to_str().unwrap(), 1, "e", "f")
            .unwrap_err();
        assert!(matches!(err, AlignError::MissingTargetFile(_)));
    }
}
