

// imports
use crate::align::Aligner;
use crate::config::{files_handling, Config};
use crate::corpus::ParallelCorpus;
use crate::lm::LanguageModel;
use crate::model::AlignmentModel;

use core::panic;
use std::env;
use std::time::Instant;

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 3 steps -
    // -> configuration of arguments
    // -> EM training of the alignment model (or loading a cached one)
    // -> n-gram counting of the source-side language model

    pub fn run() {

        println!("entering program...");
        let args: Vec<String> = env::args().collect();

        println!("building parameters...");
        let params = match Config::new(&args) {
            Ok(config) => config.get_params(),
            Err(e) => panic!("{}", e)
        };

        // train the alignment model unless a cached one was asked for
        let model = if params.cached_model.is_none() || params.cached_model.unwrap() == false {

            let timer = Instant::now();
            println!("{}", params);
            println!("loading parallel corpus...");

            let corpus = match ParallelCorpus::read_parallel(
                &params.train_dir,
                params.num_sentences,
                &params.source_suffix,
                &params.target_suffix,
            ) {
                Ok(corpus) => corpus,
                Err(e) => panic!("{}", e)
            };
            println!("loaded {} sentence pairs, took {} seconds ...", corpus.len(), timer.elapsed().as_secs());

            let timer = Instant::now();
            println!("starting EM training...");
            let model = match Aligner::train(&corpus, params.max_iter) {
                Ok(model) => model,
                Err(e) => panic!("{}", e)
            };

            if let Err(e) = files_handling::save_output::<AlignmentModel>(&params.output_dir, "am", &model) {
                panic!("{}", e)
            }
            println!("finished training, saved alignment model. Took {} seconds ...", timer.elapsed().as_secs());
            model

        } else {

            // the alignment model was trained and saved already, load it
            let am_path = (&params.output_dir).to_string() + "/am";
            match files_handling::read_input::<AlignmentModel>(&am_path) {
                Ok(model) => model,
                Err(e) => panic!("{}", e)
            }
        };
        println!("alignment table holds {} source words over {} support pairs", model.n_rows(), model.n_pairs());

        // count the source-side language model for the decoder and evaluator
        let timer = Instant::now();
        println!("starting language model counting...");
        let lm = match LanguageModel::train(&params.train_dir, &params.source_suffix) {
            Ok(lm) => lm,
            Err(e) => panic!("{}", e)
        };
        if let Err(e) = files_handling::save_output::<LanguageModel>(&params.output_dir, "lm", &lm) {
            panic!("{}", e)
        }
        println!("finished language model over {} word types, saved counts. Took {} seconds ...", lm.vocab_size(), timer.elapsed().as_secs());

    }

}
