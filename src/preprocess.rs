
// imports
use regex::{Captures, Regex};

// sentence boundary sentinels, added to every preprocessed line
pub const SENT_START: &str = "SENTSTART";
pub const SENT_END: &str = "SENTEND";

// line preprocessor for one language of the pair. Lower-cases, isolates
// end-of-sentence punctuation, separates language-specific contractions
// and wraps the result with the sentence boundary sentinels. Tokens in the
// output are whitespace-delimited, the trainer treats them as opaque.
pub struct Preprocessor {
    french: bool,
    punctuation: Regex,
    trailing_apostrophe: Regex,
    spaces: Regex,
    article: Regex,
    consonant: Regex,
    d_elision: Regex,
    pronoun: Regex,
}

impl Preprocessor {

    // `language` is the language-identifying file suffix. The exact suffix
    // "f" turns the french contraction rules on, any other value gets the
    // language-neutral rules only
    pub fn new(language: &str) -> Preprocessor {

        // the patterns are fixed, safe to unwrap
        Self {
            french: language == "f",
            punctuation: Regex::new(r#"([\.,!\?\[\]\(\):;\+\-<>="])"#).unwrap(),
            trailing_apostrophe: Regex::new(r"('\s)").unwrap(),
            spaces: Regex::new(r"\s+").unwrap(),
            article: Regex::new(r"(\s)(l['’]|qu['’])").unwrap(),
            consonant: Regex::new(r"([bcfhjklmnpqrstvxz]['’])([a-zà-ÿ])").unwrap(),
            d_elision: Regex::new(r"d'([a-zà-ÿ]+)").unwrap(),
            pronoun: Regex::new(r"(['’])(on|il)").unwrap(),
        }
    }

    pub fn preprocess(&self, line: &str) -> String {

        let mut out = line.trim().to_lowercase();
        out = self.punctuation.replace_all(&out, " $1 ").into_owned();
        out = self.trailing_apostrophe.replace_all(&out, " $1 ").into_owned();
        out = self.spaces.replace_all(&out, " ").trim().to_string();
        out = format!("{} {} {}", SENT_START, out, SENT_END);

        if self.french {
            out = self.split_contractions(&out);
        }

        self.spaces.replace_all(&out, " ").trim().to_string()
    }

    fn split_contractions(&self, sentence: &str) -> String {

        // l' and qu' are separated from the following word, as are single
        // consonants carrying an elision (c'est -> c' est). d' stays glued
        // in the fixed expressions d'abord / d'accord / d'ailleurs /
        // d'habitude and is separated everywhere else.
        let mut out = self.article.replace_all(sentence, "$1$2 ").into_owned();
        out = self.consonant.replace_all(&out, "$1 $2").into_owned();
        out = self
            .d_elision
            .replace_all(&out, |caps: &Captures| {
                match &caps[1] {
                    "abord" | "accord" | "ailleurs" | "habitude" => caps[0].to_string(),
                    rest => format!("d' {}", rest),
                }
            })
            .into_owned();
        out = self.pronoun.replace_all(&out, "$1 $2").into_owned();
        out
    }
}
