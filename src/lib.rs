
mod pipeline;
mod config;
mod corpus;
mod model;
mod align;
mod lm;
mod bleu;
mod preprocess;
mod error;

pub use pipeline::Pipeline;
pub use config::{files_handling, Config, JsonParams};
pub use corpus::{ParallelCorpus, Vocab};
pub use model::AlignmentModel;
pub use align::{Aligner, EmBuffers};
pub use lm::{LanguageModel, Smoothing};
pub use bleu::bleu_score;
pub use preprocess::{Preprocessor, SENT_END, SENT_START};
pub use error::AlignError;
