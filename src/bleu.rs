
// single-level n-gram precision score in [0, 1] for one candidate
// translation against one or more references, optionally scaled by a
// brevity penalty. n = 1 scores unigrams only, n = 2 bigrams only, the
// levels are never mixed or averaged.

pub fn bleu_score(candidate: &str, references: &[&str], n: usize, brevity: bool) -> f64 {

    let candidate_ngrams = to_ngrams(candidate, n);
    if candidate_ngrams.is_empty() {
        return 0.0;
    }

    let reference_ngrams: Vec<Vec<Vec<&str>>> =
        references.iter().map(|r| to_ngrams(r, n)).collect();

    // every candidate n-gram occurrence found in any reference counts once
    let mut matched = 0usize;
    for ngram in &candidate_ngrams {
        if reference_ngrams.iter().any(|r| r.contains(ngram)) {
            matched += 1;
        }
    }

    let mut score = matched as f64 / candidate_ngrams.len() as f64;

    if brevity {
        score *= brevity_penalty(candidate, references);
    }
    score
}

// penalty against candidates shorter than the closest-length reference:
// exp(1 - r/c) when r/c >= 1, otherwise 1
fn brevity_penalty(candidate: &str, references: &[&str]) -> f64 {

    let candidate_length = candidate.split(' ').count();

    let mut closest: Option<usize> = None;
    for reference in references {
        let reference_length = reference.split(' ').count();
        let diff = reference_length.abs_diff(candidate_length);
        let closer = match closest {
            None => true,
            Some(best) => diff < best.abs_diff(candidate_length),
        };
        if closer {
            closest = Some(reference_length);
        }
    }

    let reference_length = match closest {
        Some(len) => len,
        None => return 1.0,
    };

    let ratio = reference_length as f64 / candidate_length as f64;
    if ratio >= 1.0 {
        (1.0 - ratio).exp()
    } else {
        1.0
    }
}

fn to_ngrams(sentence: &str, n: usize) -> Vec<Vec<&str>> {

    let words: Vec<&str> = sentence.split(' ').collect();
    if n == 0 || words.len() < n {
        return Vec::new();
    }
    words.windows(n).map(|w| w.to_vec()).collect()
}


#[cfg(test)]
mod tests {

    use super::*;

    const REFERENCES: [&str; 2] = [
        "SENTSTART je suis faim SENTEND",
        "SENTSTART nous sommes faime SENTEND",
    ];

    #[test]
    fn unigram_baseline_test() {

        // only the two sentinels of the candidate appear in a reference,
        // 2 matches out of 5 unigrams
        let score = bleu_score("SENTSTART i am hungry SENTEND", &REFERENCES, 1, false);
        assert!((score - 2.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn bigram_test() {

        // no candidate bigram appears in either reference
        let score = bleu_score("SENTSTART i am hungry SENTEND", &REFERENCES, 2, false);
        assert_eq!(score, 0.0);

        // (SENTSTART, je) and (je, suis) appear in the first reference
        let score = bleu_score("SENTSTART je suis hungry SENTEND", &REFERENCES, 2, false);
        assert!((score - 2.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn brevity_penalty_test() {

        // same-length candidate is not penalized
        let with = bleu_score("SENTSTART i am hungry SENTEND", &REFERENCES, 1, true);
        assert!((with - 2.0 / 5.0).abs() < 1e-12);

        // a three-token candidate against five-token references: 2/3 of the
        // unigrams match, scaled by exp(1 - 5/3)
        let short = bleu_score("SENTSTART i SENTEND", &REFERENCES, 1, true);
        let expected = 2.0 / 3.0 * (1.0 - 5.0 / 3.0f64).exp();
        assert!((short - expected).abs() < 1e-12);
    }

    #[test]
    fn repeated_ngrams_count_per_occurrence_test() {

        // both occurrences of "je" count, "bad" matches nothing
        let score = bleu_score("SENTSTART je je bad SENTEND", &REFERENCES, 1, false);
        assert!((score - 4.0 / 5.0).abs() < 1e-12);
    }
}
