
// imports
use crate::error::AlignError;
use crate::preprocess::Preprocessor;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

// add-delta smoothing parameters for log_prob, 0 < delta <= 1. The vocab
// size used in the denominator is the unigram vocabulary of the model.
#[derive(Debug, Clone, Copy)]
pub struct Smoothing {
    pub delta: f64,
}

// unigram / bigram count table over one language of the corpus, the
// collaborator consumed by the external decoder and by the perplexity
// evaluator. The alignment trainer neither reads nor writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageModel {
    pub uni: HashMap<String, u64>,
    pub bi: HashMap<String, HashMap<String, u64>>,
}

impl LanguageModel {

    pub fn new() -> LanguageModel {
        Self::default()
    }

    // counts every preprocessed line of every file in `data_dir` whose name
    // ends with the language suffix
    pub fn train(data_dir: &str, language: &str) -> Result<LanguageModel, AlignError> {

        let pp = Preprocessor::new(language);
        let mut lm = LanguageModel::new();

        let mut paths: Vec<PathBuf> = fs::read_dir(data_dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        for path in paths {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if !matches_language(name, language) {
                continue;
            }

            let f = File::open(&path).map_err(|e| AlignError::FileRead {
                path: path.clone(),
                source: e,
            })?;
            for line in BufReader::new(f).lines() {
                lm.add_sentence(&pp.preprocess(&line?));
            }
        }

        Ok(lm)
    }

    // accumulates the unigram and bigram counts of one preprocessed line
    pub fn add_sentence(&mut self, sentence: &str) {

        let tokens: Vec<&str> = sentence.split(' ').collect();
        for (i, token) in tokens.iter().enumerate() {
            *self.uni.entry((*token).to_owned()).or_insert(0) += 1;
            if i > 0 {
                *self
                    .bi
                    .entry(tokens[i - 1].to_owned())
                    .or_default()
                    .entry((*token).to_owned())
                    .or_insert(0) += 1;
            }
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.uni.len()
    }

    // log2 probability of a preprocessed sentence under the bigram chain.
    // Without smoothing an unseen bigram makes the whole sentence
    // probability -inf
    pub fn log_prob(&self, sentence: &str, smoothing: Option<Smoothing>) -> f64 {

        let tokens: Vec<&str> = sentence.split(' ').collect();
        let vocab_size = self.vocab_size() as f64;

        let mut log_prob = 0.0;
        for window in tokens.windows(2) {
            let (previous, word) = (window[0], window[1]);
            let uni_count = self.uni.get(previous).copied().unwrap_or(0) as f64;
            let bi_count = self
                .bi
                .get(previous)
                .and_then(|row| row.get(word))
                .copied()
                .unwrap_or(0) as f64;

            match smoothing {
                None => {
                    if uni_count > 0.0 && bi_count > 0.0 {
                        log_prob += (bi_count / uni_count).log2();
                    } else {
                        return f64::NEG_INFINITY;
                    }
                }
                Some(Smoothing { delta }) => {
                    log_prob += ((bi_count + delta) / (uni_count + delta * vocab_size)).log2();
                }
            }
        }
        log_prob
    }

    // perplexity of a test directory under the model: 2^(-logprob / N) over
    // the lines with finite probability, N counting their tokens
    pub fn perplexity(
        &self,
        test_dir: &str,
        language: &str,
        smoothing: Option<Smoothing>,
    ) -> Result<f64, AlignError> {

        let pp = Preprocessor::new(language);

        let mut log_prob_sum = 0.0;
        let mut n_tokens = 0usize;

        for entry in fs::read_dir(test_dir)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if !matches_language(name, language) {
                continue;
            }

            let f = File::open(&path).map_err(|e| AlignError::FileRead {
                path: path.clone(),
                source: e,
            })?;
            for line in BufReader::new(f).lines() {
                let processed = pp.preprocess(&line?);
                let lp = self.log_prob(&processed, smoothing);
                if lp > f64::NEG_INFINITY {
                    log_prob_sum += lp;
                    n_tokens += processed.split(' ').count();
                }
            }
        }

        if n_tokens == 0 {
            return Ok(0.0);
        }
        Ok(2f64.powf(-log_prob_sum / n_tokens as f64))
    }
}

// a file belongs to a language when its extension equals the language
// suffix exactly, a bare trailing match would catch files like "readme"
fn matches_language(name: &str, language: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, extension)) => extension == language,
        None => false,
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    fn toy_lm() -> LanguageModel {
        let mut lm = LanguageModel::new();
        lm.add_sentence("SENTSTART the dog SENTEND");
        lm.add_sentence("SENTSTART the house SENTEND");
        lm
    }

    #[test]
    fn counts_test() {

        let lm = toy_lm();
        assert_eq!(lm.uni.get("SENTSTART"), Some(&2));
        assert_eq!(lm.uni.get("the"), Some(&2));
        assert_eq!(lm.uni.get("dog"), Some(&1));
        assert_eq!(lm.bi.get("SENTSTART").unwrap().get("the"), Some(&2));
        assert_eq!(lm.bi.get("the").unwrap().get("dog"), Some(&1));
        assert_eq!(lm.bi.get("dog").unwrap().get("SENTEND"), Some(&1));
        assert_eq!(lm.vocab_size(), 5);
    }

    #[test]
    fn log_prob_test() {

        let lm = toy_lm();

        // log2(2/2) + log2(1/2) + log2(1/1) = -1
        let lp = lm.log_prob("SENTSTART the dog SENTEND", None);
        assert!((lp - (-1.0)).abs() < 1e-12);

        // unseen bigram without smoothing
        let lp = lm.log_prob("SENTSTART dog the SENTEND", None);
        assert_eq!(lp, f64::NEG_INFINITY);

        // smoothing keeps it finite
        let lp = lm.log_prob(
            "SENTSTART dog the SENTEND",
            Some(Smoothing { delta: 0.5 }),
        );
        assert!(lp.is_finite());
    }

    #[test]
    fn train_from_directory_test() {

        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join("toy.e")).unwrap();
        writeln!(f, "The dog").unwrap();
        writeln!(f, "The house").unwrap();
        // the other language must not leak into the counts
        let mut f = File::create(dir.path().join("toy.f")).unwrap();
        writeln!(f, "Le chien").unwrap();

        let lm = LanguageModel::train(dir.path().to_str().unwrap(), "e").unwrap();
        assert_eq!(lm.uni.get("the"), Some(&2));
        assert_eq!(lm.uni.get("le"), None);
    }

    #[test]
    fn suffix_matches_extension_only_test() {

        use std::io::Write;

        // "readme" ends in the letter but has no ".e" extension
        let dir = tempfile::tempdir().unwrap();
        let mut f = File::create(dir.path().join("toy.e")).unwrap();
        writeln!(f, "The dog").unwrap();
        let mut f = File::create(dir.path().join("readme")).unwrap();
        writeln!(f, "Stray notes").unwrap();

        let lm = LanguageModel::train(dir.path().to_str().unwrap(), "e").unwrap();
        assert_eq!(lm.uni.get("the"), Some(&1));
        assert_eq!(lm.uni.get("stray"), None);
        assert_eq!(lm.uni.get("notes"), None);
    }
}
