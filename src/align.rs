
// imports
use crate::corpus::{ParallelCorpus, Vocab};
use crate::error::AlignError;
use crate::model::AlignmentModel;
use crate::preprocess::{SENT_END, SENT_START};

use ndarray::{s, Array1};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

// the two transient expected-count accumulators of the E-step: one slot per
// (source, target) support pair, aligned with the model's value buffer, and
// one total per source word. Allocated once and zeroed between iterations
// instead of rebuilt, the support never changes.
pub struct EmBuffers {
    pair_counts: Array1<f64>,
    totals: Array1<f64>,
}

impl EmBuffers {

    pub fn new(model: &AlignmentModel) -> EmBuffers {
        Self {
            pair_counts: Array1::zeros(model.n_pairs()),
            totals: Array1::zeros(model.n_rows()),
        }
    }

    fn reset(&mut self) {
        self.pair_counts.fill(0.0);
        self.totals.fill(0.0);
    }
}

pub struct Aligner;

impl Aligner {

    // builds the sparse support of the translation table from sentence-level
    // co-occurrence and assigns uniform initial probabilities. For every
    // source word, the support is the set of target words appearing in any
    // sentence pair where the source word also appears, each at probability
    // 1/k for support size k. The sentence boundary sentinels never enter
    // generic supports: their rows hold only the self-pair, pinned to
    // probability 1 and left out of all later re-normalization. A source
    // word co-occurring with nothing but sentinels gets an empty row.
    pub fn initialize(corpus: &ParallelCorpus) -> AlignmentModel {

        let n_source = corpus.source_vocab.len();
        let source_sentinels = sentinel_ids(&corpus.source_vocab);
        let target_sentinels = sentinel_ids(&corpus.target_vocab);

        let mut supports: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n_source];
        for (source_sentence, target_sentence) in corpus.source.iter().zip(corpus.target.iter()) {

            let target_words: BTreeSet<usize> = target_sentence
                .iter()
                .copied()
                .filter(|t| !target_sentinels.contains(t))
                .collect();
            let source_words: BTreeSet<usize> = source_sentence
                .iter()
                .copied()
                .filter(|s| !source_sentinels.contains(s))
                .collect();

            for &s in &source_words {
                supports[s].extend(target_words.iter().copied());
            }
        }

        // assemble the row-compressed layout in source-id order
        let mut offsets: Vec<usize> = Vec::with_capacity(n_source + 1);
        let mut targets: Vec<usize> = Vec::new();
        let mut probs: Vec<f64> = Vec::new();
        offsets.push(0);

        for s in 0..n_source {
            if source_sentinels.contains(&s) {
                // the pinned self-pair, SENTSTART <-> SENTSTART or
                // SENTEND <-> SENTEND
                let token = corpus.source_vocab.token(s);
                if let Some(t) = corpus.target_vocab.id(token) {
                    targets.push(t);
                    probs.push(1.0);
                }
            } else {
                let support = &supports[s];
                let k = support.len();
                for &t in support {
                    targets.push(t);
                    probs.push(1.0 / k as f64);
                }
            }
            offsets.push(targets.len());
        }

        AlignmentModel::from_parts(
            corpus.source_vocab.clone(),
            corpus.target_vocab.clone(),
            offsets,
            targets,
            Array1::from_vec(probs),
        )
    }

    // one EM iteration: accumulate expected counts over the whole corpus
    // under the current probabilities, then re-normalize each row. The new
    // value buffer is built aside and swapped in wholesale, so every E-step
    // read sees the previous iteration's probabilities.
    pub fn em_step(
        model: &mut AlignmentModel,
        corpus: &ParallelCorpus,
        buffers: &mut EmBuffers,
    ) -> Result<(), AlignError> {

        let source_sentinels = sentinel_ids(&corpus.source_vocab);
        let target_sentinels = sentinel_ids(&corpus.target_vocab);

        buffers.reset();
        let mut row_scratch: Vec<(usize, usize, f64, f64)> = Vec::new();

        // E-step
        for (source_sentence, target_sentence) in corpus.source.iter().zip(corpus.target.iter()) {

            let source_counts = multiplicities(source_sentence, &source_sentinels);
            let target_counts = multiplicities(target_sentence, &target_sentinels);
            if source_counts.is_empty() {
                continue;
            }

            for (&t, &m_t) in &target_counts {

                // denominator over every source word of the pair, repeated
                // tokens weighted by their in-sentence occurrence count
                let mut denom = 0.0;
                row_scratch.clear();
                for (&s, &m_s) in &source_counts {
                    let slot = lookup_slot(model, corpus, s, t)?;
                    let p = model.prob_at(slot);
                    denom += p * m_s;
                    row_scratch.push((slot, s, p, m_s));
                }
                if denom <= 0.0 {
                    // can only happen when the support and corpus disagree
                    return Err(AlignError::SupportViolation {
                        source_word: corpus.source_vocab.token(*source_counts.keys().next().unwrap()).to_owned(),
                        target_word: corpus.target_vocab.token(t).to_owned(),
                    });
                }

                for &(slot, s, p, m_s) in &row_scratch {
                    let q = p * m_t * m_s / denom;
                    buffers.pair_counts[slot] += q;
                    buffers.totals[s] += q;
                }
            }
        }

        // M-step: P(t|s) = count(s,t) / total(s), row by row
        let mut new_probs: Array1<f64> = Array1::zeros(model.n_pairs());
        for source_id in 0..model.n_rows() {
            let (lo, hi) = model.row_bounds(source_id);
            if lo == hi {
                continue;
            }
            if source_sentinels.contains(&source_id) {
                new_probs.slice_mut(s![lo..hi]).fill(1.0);
                continue;
            }
            let total = buffers.totals[source_id];
            if total > 0.0 {
                let row = buffers.pair_counts.slice(s![lo..hi]).mapv(|c| c / total);
                new_probs.slice_mut(s![lo..hi]).assign(&row);
            } else {
                // source word absent from this corpus, keep its row
                new_probs
                    .slice_mut(s![lo..hi])
                    .assign(&model.probs().slice(s![lo..hi]));
            }
        }
        model.replace_probs(new_probs);

        Ok(())
    }

    // total corpus log-likelihood under the model, up to the alignment
    // constant: sum over target tokens of ln of the token's mixture
    // probability. Non-decreasing from one EM iteration to the next.
    pub fn log_likelihood(model: &AlignmentModel, corpus: &ParallelCorpus) -> f64 {

        let source_sentinels = sentinel_ids(&corpus.source_vocab);
        let target_sentinels = sentinel_ids(&corpus.target_vocab);

        let mut ll = 0.0;
        for (source_sentence, target_sentence) in corpus.source.iter().zip(corpus.target.iter()) {

            let source_counts = multiplicities(source_sentence, &source_sentinels);
            let target_counts = multiplicities(target_sentence, &target_sentinels);
            if source_counts.is_empty() {
                continue;
            }

            for (&t, &m_t) in &target_counts {
                let mut mixture = 0.0;
                for (&s, &m_s) in &source_counts {
                    if s < model.n_rows() {
                        if let Some(p) = model.prob_ids(s, t) {
                            mixture += p * m_s;
                        }
                    }
                }
                if mixture > 0.0 {
                    ll += m_t * mixture.ln();
                } else {
                    return f64::NEG_INFINITY;
                }
            }
        }
        ll
    }

    // the full training run: uniform initialization followed by a fixed,
    // caller-chosen number of EM iterations. Iteration count is the sole
    // termination control, there is no convergence stop.
    pub fn train(corpus: &ParallelCorpus, max_iter: usize) -> Result<AlignmentModel, AlignError> {

        let mut model = Self::initialize(corpus);
        println!(
            "initialized alignment table: {} source words, {} support pairs",
            model.n_rows(),
            model.n_pairs()
        );

        let mut buffers = EmBuffers::new(&model);
        for iteration in 0..max_iter {
            let timer = Instant::now();
            Self::em_step(&mut model, corpus, &mut buffers)?;
            let ll = Self::log_likelihood(&model, corpus);
            println!(
                "finished iteration {} / {}, log-likelihood: {}, took {} seconds...",
                iteration + 1,
                max_iter,
                ll,
                timer.elapsed().as_secs()
            );
        }

        Ok(model)
    }
}

fn sentinel_ids(vocab: &Vocab) -> BTreeSet<usize> {
    [SENT_START, SENT_END]
        .iter()
        .filter_map(|tok| vocab.id(tok))
        .collect()
}

// in-sentence occurrence count per distinct word id, sentinels skipped
fn multiplicities(sentence: &[usize], sentinels: &BTreeSet<usize>) -> BTreeMap<usize, f64> {
    let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
    for &id in sentence {
        if !sentinels.contains(&id) {
            *counts.entry(id).or_insert(0.0) += 1.0;
        }
    }
    counts
}

fn lookup_slot(
    model: &AlignmentModel,
    corpus: &ParallelCorpus,
    source_id: usize,
    target_id: usize,
) -> Result<usize, AlignError> {
    let slot = if source_id < model.n_rows() {
        model.slot(source_id, target_id)
    } else {
        None
    };
    slot.ok_or_else(|| AlignError::SupportViolation {
        source_word: corpus.source_vocab.token(source_id).to_owned(),
        target_word: corpus.target_vocab.token(target_id).to_owned(),
    })
}
