
// imports
use crate::error::AlignError;

use serde_json::Value;
use std::fmt::Display;
use std::fs;

#[derive(Clone, Debug)]
pub struct JsonParams {
    pub train_dir: String,
    pub output_dir: String,
    pub num_sentences: usize,
    pub max_iter: usize,
    pub source_suffix: String,
    pub target_suffix: String,
    pub cached_model: Option<bool>,
}

impl Display for JsonParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        train_dir: {}
        output_dir: {}
        num_sentences: {}
        max_iter: {}
        source_suffix: {}
        target_suffix: {}
        cached_model: {:?}",
        self.train_dir, self.output_dir, self.num_sentences, self.max_iter,
        self.source_suffix, self.target_suffix, self.cached_model)
    }
}

pub struct Config {
    params: JsonParams,
}

impl Config {

    pub fn get_params(&self) -> JsonParams {
        return self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config, AlignError> {

        if args.len() != 2 {
            return Err(AlignError::Config("input should be a path to json file only".to_string()));
        }

        // parse input json
        let f = fs::File::open(&args[1]).expect("cannot open json file");
        let json: Value = serde_json::from_reader(f).expect("cannot read json file");

        // validate input and output in json
        let train_dir = json.get("train_dir").expect("train_dir was not supplied throught json").as_str().expect("cannot cast train dir to string");
        let output_dir = json.get("output_dir").expect("output_dir was not supplied throught json").as_str().expect("cannot cast output path to string");

        // handle default vs input parameters
        let num_sentences = match json.get("num_sentences") {
            Some(num_sentences) => num_sentences.as_i64().expect("panic since given num_sentences is not numeric"),
            None => 10000
        };
        let max_iter = match json.get("max_iter") {
            Some(max_iter) => max_iter.as_i64().expect("panic since given max_iter is not numeric"),
            None => 30
        };
        // the suffixes double as language tags: the preprocessor turns its
        // french contraction rules on only for the exact suffix "f"
        let source_suffix = match json.get("source_suffix") {
            Some(source_suffix) => source_suffix.as_str().expect("cannot cast source_suffix to string").to_owned(),
            None => "e".to_string()
        };
        let target_suffix = match json.get("target_suffix") {
            Some(target_suffix) => target_suffix.as_str().expect("cannot cast target_suffix to string").to_owned(),
            None => "f".to_string()
        };
        let cached_model = match json.get("cached_model") {
            Some(cached_model) => Some(cached_model.as_bool().expect("panic since given cached_model is not boolean")),
            None => None
        };

        let params = JsonParams {
            train_dir: train_dir.to_owned(),
            output_dir: output_dir.to_owned(),
            num_sentences: num_sentences as usize,
            max_iter: max_iter as usize,
            source_suffix: source_suffix,
            target_suffix: target_suffix,
            cached_model: cached_model,
        };

        Ok (
            Self {
                params: params
            }
        )
    }

}


// the persistence seam: everything durable goes through these two traits,
// so the decoder-side tooling loads artifacts the same way the trainer
// saves them.
pub mod files_handling {

    use crate::error::AlignError;
    use crate::lm::LanguageModel;
    use crate::model::AlignmentModel;

    use flate2::read::GzDecoder;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, ErrorKind};
    use std::path::PathBuf;

    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item, AlignError> {
        let input = <R as ReadFile>::read_file(file_path)?;
        Ok(input)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: &S) -> Result<(), AlignError> {

        // create output folder
        if let Err(e) = fs::create_dir_all(output_dir) {
            panic!("{}", e)
        }

        item.save_file(output_dir, file_name)?;
        return Ok(())
    }

    pub trait ReadFile {
        type Item;
        fn read_file(file_path: &str) -> Result<Self::Item, AlignError>;
    }

    pub trait SaveFile {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), AlignError>;
    }

    fn open_model_file(in_file: String) -> Result<File, AlignError> {
        File::open(&in_file).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AlignError::ModelNotFound(PathBuf::from(in_file))
            } else {
                AlignError::Io(e)
            }
        })
    }

    // the alignment model is the big artifact, stored compressed in binary
    impl ReadFile for AlignmentModel {
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, AlignError> {
            let in_file = file_path.to_string() + ".bin.gz";
            let f = open_model_file(in_file)?;
            let reader = GzDecoder::new(BufReader::new(f));
            let item = bincode::deserialize_from(reader)?;
            return Ok(item)
        }
    }

    impl SaveFile for AlignmentModel {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), AlignError> {
            let out = output_dir.to_string() + "/" + file_name + ".bin.gz";
            let f = BufWriter::new(File::create(out)?);
            let mut writer = GzEncoder::new(f, Compression::default());
            bincode::serialize_into(&mut writer, self)?;
            writer.finish()?;
            return Ok(())
        }
    }

    // the language model stays human-readable
    impl ReadFile for LanguageModel {
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, AlignError> {
            let in_file = file_path.to_string() + ".json";
            let f = open_model_file(in_file)?;
            let item = serde_json::from_reader(BufReader::new(f))?;
            return Ok(item)
        }
    }

    impl SaveFile for LanguageModel {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), AlignError> {
            let out = output_dir.to_string() + "/" + file_name + ".json";
            let f = File::create(out)?;
            serde_json::to_writer(f, self)?;
            return Ok(())
        }
    }

    // translation-table export for inspection and for the external decoder
    impl SaveFile for Vec<(String, String, f64)> {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), AlignError> {

            let out = output_dir.to_string() + "/" + file_name + ".csv";
            let mut wrt = csv::WriterBuilder::new().from_path(out)?;
            wrt.write_record(&["Source", "Target", "Prob"])?;

            for (source_word, target_word, prob) in self {
                wrt.serialize((source_word, target_word, prob))?;
            }
            wrt.flush()?;
            Ok(())
        }
    }
}


#[cfg(test)]
mod tests {

    use super::files_handling::{read_input, save_output};
    use crate::align::Aligner;
    use crate::corpus::ParallelCorpus;
    use crate::error::AlignError;
    use crate::lm::LanguageModel;
    use crate::model::AlignmentModel;

    #[test]
    fn alignment_model_round_trip_test() {

        let corpus = ParallelCorpus::from_lines(
            &["SENTSTART the dog SENTEND", "SENTSTART the cat SENTEND"],
            &["SENTSTART le chien SENTEND", "SENTSTART le chat SENTEND"],
        );
        let model = Aligner::train(&corpus, 3).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        save_output::<AlignmentModel>(dir_str, "am", &model).unwrap();

        let loaded = read_input::<AlignmentModel>(&format!("{}/am", dir_str)).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn model_not_found_test() {

        let dir = tempfile::tempdir().unwrap();
        let missing = format!("{}/am", dir.path().to_str().unwrap());
        let err = read_input::<AlignmentModel>(&missing).unwrap_err();
        assert!(matches!(err, AlignError::ModelNotFound(_)));
    }

    #[test]
    fn language_model_round_trip_test() {

        let mut lm = LanguageModel::new();
        lm.add_sentence("SENTSTART the dog SENTEND");
        lm.add_sentence("SENTSTART the house SENTEND");

        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        save_output::<LanguageModel>(dir_str, "lm", &lm).unwrap();

        let loaded = read_input::<LanguageModel>(&format!("{}/lm", dir_str)).unwrap();
        assert_eq!(loaded, lm);
    }

    #[test]
    fn translation_export_test() {

        use std::fs;

        let corpus = ParallelCorpus::from_lines(
            &["SENTSTART dog SENTEND"],
            &["SENTSTART chien SENTEND"],
        );
        let model = Aligner::initialize(&corpus);
        let entries = model.entries_above(0.5);

        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        save_output::<Vec<(String, String, f64)>>(dir_str, "table", &entries).unwrap();

        let written = fs::read_to_string(format!("{}/table.csv", dir_str)).unwrap();
        assert!(written.starts_with("Source,Target,Prob"));
        assert!(written.contains("dog,chien,1.0"));
    }
}
