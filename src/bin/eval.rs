
use core::panic;
use std::{error::Error, env, fs::File, io::{self, BufRead}};
extern crate align_trainer;
use align_trainer::{bleu_score, files_handling, AlignmentModel, LanguageModel, Smoothing};


// evaluation tooling around the trained artifacts, runnable independently
// from the training pipeline:
// perplexity of a test corpus under the saved language model,
// BLEU scoring of candidate translations against references,
// and a csv dump of the translation table for the external decoder.

fn main() {

    // arguments to this executable should be:
    // a letter selector: "p" for perplexity, "b" for bleu, "t" for table
    // followed by selector-specific arguments:
    // p <model_dir> <test_dir> <language_suffix>
    // b <input_file> <ngram_order>
    // t <model_dir> <output_dir> <threshold>
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 { panic!("first argument should be a selector, one of p / b / t"); }
    let selector = &args[1];

    match selector.as_str() {
        "p" => {
            if args.len() != 5 { panic!("usage: p <model_dir> <test_dir> <language_suffix>"); }
            if let Err(e) = run_perplexity(&args[2], &args[3], &args[4]) {
                panic!("{}", e);
            };
        },
        "b" => {
            // expects a file in which the first line is the candidate
            // translation and every following line is one reference
            if args.len() != 4 { panic!("usage: b <input_file> <ngram_order>"); }
            let n: usize = args[3].parse().expect("ngram order should be a small integer");

            let open_in_file = File::open(&args[2]).expect("could not open input file");
            let lines = io::BufReader::new(open_in_file).lines()
            .map(|line| line.expect("could not read line"))
            .collect::<Vec<String>>();
            if lines.len() < 2 { panic!("input file needs a candidate line and at least one reference line"); }

            run_bleu(&lines[0], &lines[1..], n);
        },
        "t" => {
            if args.len() != 5 { panic!("usage: t <model_dir> <output_dir> <threshold>"); }
            let threshold: f64 = args[4].parse().expect("threshold should be a probability");
            if let Err(e) = run_table_export(&args[2], &args[3], threshold) {
                panic!("{}", e);
            };
        },
        _ => panic!("unrecognized selector in first argument {}", &args[1])
    }

}


fn run_perplexity(model_dir: &str, test_dir: &str, language: &str) -> Result<(), Box<dyn Error>> {

    let lm_path = model_dir.to_string() + "/lm";
    let lm = files_handling::read_input::<LanguageModel>(&lm_path)?;
    println!("loaded language model over {} word types", lm.vocab_size());

    let pp = lm.perplexity(test_dir, language, None)?;
    println!("perplexity without smoothing: {}", pp);

    for delta in [0.001, 0.01, 0.1, 0.5, 1.0] {
        let pp = lm.perplexity(test_dir, language, Some(Smoothing { delta }))?;
        println!("perplexity with delta {}: {}", delta, pp);
    }

    Ok(())
}

fn run_bleu(candidate: &str, references: &[String], n: usize) {

    let references: Vec<&str> = references.iter().map(|r| r.as_str()).collect();

    let plain = bleu_score(candidate, &references, n, false);
    let with_brevity = bleu_score(candidate, &references, n, true);
    println!("candidate: {}", candidate);
    println!("{}-gram BLEU: {}", n, plain);
    println!("{}-gram BLEU with brevity penalty: {}", n, with_brevity);
}

fn run_table_export(model_dir: &str, output_dir: &str, threshold: f64) -> Result<(), Box<dyn Error>> {

    let am_path = model_dir.to_string() + "/am";
    let model = files_handling::read_input::<AlignmentModel>(&am_path)?;
    println!("loaded alignment table, {} source words over {} support pairs", model.n_rows(), model.n_pairs());

    let entries = model.entries_above(threshold);
    println!("exporting {} entries above probability {}", entries.len(), threshold);
    files_handling::save_output::<Vec<(String, String, f64)>>(output_dir, "table", &entries)?;

    Ok(())
}
