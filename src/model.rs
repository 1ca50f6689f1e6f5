
// imports
use crate::corpus::Vocab;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

// sparse row-stochastic translation table P(target | source), rows keyed by
// interned source-word ids. The support (which target columns exist in each
// row) is fixed when the model is initialized and never grows afterwards,
// only the probability values change. Layout is row-compressed: row s owns
// the slots offsets[s]..offsets[s+1] of `targets` and `probs`, with target
// ids sorted inside each row for binary-search lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentModel {
    source_vocab: Vocab,
    target_vocab: Vocab,
    offsets: Vec<usize>,
    targets: Vec<usize>,
    probs: Array1<f64>,
}

impl AlignmentModel {

    pub(crate) fn from_parts(
        source_vocab: Vocab,
        target_vocab: Vocab,
        offsets: Vec<usize>,
        targets: Vec<usize>,
        probs: Array1<f64>,
    ) -> AlignmentModel {

        assert_eq!(offsets.len(), source_vocab.len() + 1);
        assert_eq!(targets.len(), probs.len());

        Self {
            source_vocab,
            target_vocab,
            offsets,
            targets,
            probs,
        }
    }

    pub fn source_vocab(&self) -> &Vocab {
        &self.source_vocab
    }

    pub fn target_vocab(&self) -> &Vocab {
        &self.target_vocab
    }

    // number of (source, target) pairs in the support
    pub fn n_pairs(&self) -> usize {
        self.targets.len()
    }

    pub fn n_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    // the sorted target ids of row `source_id`
    pub fn row_targets(&self, source_id: usize) -> &[usize] {
        &self.targets[self.offsets[source_id]..self.offsets[source_id + 1]]
    }

    pub fn row_bounds(&self, source_id: usize) -> (usize, usize) {
        (self.offsets[source_id], self.offsets[source_id + 1])
    }

    // flat slot of the (source_id, target_id) pair, None when the pair is
    // outside the support
    pub fn slot(&self, source_id: usize, target_id: usize) -> Option<usize> {
        let (lo, hi) = self.row_bounds(source_id);
        self.targets[lo..hi]
            .binary_search(&target_id)
            .ok()
            .map(|i| lo + i)
    }

    pub fn prob_at(&self, slot: usize) -> f64 {
        self.probs[slot]
    }

    pub fn prob_ids(&self, source_id: usize, target_id: usize) -> Option<f64> {
        self.slot(source_id, target_id).map(|i| self.probs[i])
    }

    // probability by word strings, for consumers holding raw tokens
    pub fn prob(&self, source_word: &str, target_word: &str) -> Option<f64> {
        let s = self.source_vocab.id(source_word)?;
        let t = self.target_vocab.id(target_word)?;
        self.prob_ids(s, t)
    }

    pub(crate) fn probs(&self) -> &Array1<f64> {
        &self.probs
    }

    // replaces the whole probability buffer after an M-step. The support
    // stays as-is, the buffer must match it slot for slot.
    pub(crate) fn replace_probs(&mut self, probs: Array1<f64>) {
        assert_eq!(probs.len(), self.probs.len());
        self.probs = probs;
    }

    // all support entries of one source word as (target word, probability),
    // most probable first
    pub fn translations(&self, source_word: &str) -> Vec<(String, f64)> {

        let s = match self.source_vocab.id(source_word) {
            Some(s) => s,
            None => return Vec::new(),
        };
        let (lo, hi) = self.row_bounds(s);
        let mut out: Vec<(String, f64)> = (lo..hi)
            .map(|i| (self.target_vocab.token(self.targets[i]).to_owned(), self.probs[i]))
            .collect();
        out.sort_by(|(_, p), (_, q)| q.total_cmp(p));
        out
    }

    // every (source, target, probability) entry with probability above the
    // threshold, the export consumed by the external decoder tooling
    pub fn entries_above(&self, threshold: f64) -> Vec<(String, String, f64)> {

        let mut out = Vec::new();
        for s in 0..self.n_rows() {
            let (lo, hi) = self.row_bounds(s);
            for i in lo..hi {
                if self.probs[i] > threshold {
                    out.push((
                        self.source_vocab.token(s).to_owned(),
                        self.target_vocab.token(self.targets[i]).to_owned(),
                        self.probs[i],
                    ));
                }
            }
        }
        out
    }
}
