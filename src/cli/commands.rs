// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands and all their configurable flags:
//
//   build-cache       corpus dirs + embeddings file → cache
//   convert-word2vec  binary word2vec → text word2vec
//   train             repeated runs + accuracy report
//   predict           apply one saved run to a corpus file
//   baseline          coin-flip accuracy on dev and test
//   dissimilar        least-similar reason pairs
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{ArgAction, Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::data::encoder::PadSide;
use crate::infra::embeddings_file::EmbeddingsFormat;
use crate::ml::model::Architecture;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the corpus vocabulary and its pretrained vectors into a cache file
    BuildCache(BuildCacheArgs),

    /// Rewrite a binary word2vec file as text
    ConvertWord2vec(ConvertArgs),

    /// Train and evaluate the warrant classifier
    Train(TrainArgs),

    /// Predict labels for a corpus file with a trained run
    Predict(PredictArgs),

    /// Report the accuracy of random guessing on dev and test
    Baseline(BaselineArgs),

    /// Pair every reason with its most dissimilar reason of the same stance
    Dissimilar(DissimilarArgs),
}

#[derive(Args, Debug)]
pub struct BuildCacheArgs {
    /// Cache file to write (e.g. embeddings_cache_file_word2vec.bin.gz)
    pub output: PathBuf,

    /// Pretrained embeddings file, optionally gzipped
    pub embeddings: PathBuf,

    /// Directories whose .tsv / .csv / .gz files make up the corpus
    #[arg(required = true)]
    pub input_dirs: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "word2vec")]
    pub format: EmbeddingsFormat,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Binary word2vec file (e.g. GoogleNews-vectors-negative300.bin.gz)
    pub input: PathBuf,

    /// Text output; gzipped when the name ends in "gz"
    pub output: PathBuf,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[arg(long, default_value = "embeddings_cache_file_word2vec.bin.gz")]
    pub cache: PathBuf,

    #[arg(long, default_value = "data/train-w-swap.tsv")]
    pub train_file: PathBuf,

    #[arg(long, default_value = "data/dev.tsv")]
    pub dev_file: PathBuf,

    #[arg(long, default_value = "data/test.tsv")]
    pub test_file: PathBuf,

    /// Directory for configs, weights per run and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Every sequence is padded / truncated to this many tokens
    #[arg(long, default_value_t = 100)]
    pub max_len: usize,

    #[arg(long, value_enum, default_value = "pre")]
    pub padding: PadSide,

    #[arg(long, value_enum, default_value = "pre")]
    pub truncating: PadSide,

    /// Only the N most frequent words get their own index
    #[arg(long)]
    pub nb_words: Option<usize>,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Fraction of the training file (its tail) held out for validation
    #[arg(long, default_value_t = 0.1)]
    pub validation_split: f64,

    /// Independent training runs, each with its own seed
    #[arg(long, default_value_t = 3)]
    pub runs: usize,

    /// Run i uses seed + i
    #[arg(long, default_value_t = 12345)]
    pub seed: u64,

    #[arg(long, default_value_t = 64)]
    pub lstm_size: usize,

    #[arg(long, default_value_t = 0.9)]
    pub dropout: f64,

    #[arg(long, value_enum, default_value = "intra-warrant")]
    pub architecture: Architecture,

    /// Use debate title + info as extra context (--rich-context false to disable)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub rich_context: bool,

    /// Also write the full report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the dev lines the last run got wrong
    #[arg(long)]
    pub show_errors: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            cache_file:       a.cache,
            train_file:       a.train_file,
            dev_file:         a.dev_file,
            test_file:        a.test_file,
            checkpoint_dir:   a.checkpoint_dir,
            max_len:          a.max_len,
            padding:          a.padding,
            truncating:       a.truncating,
            nb_words:         a.nb_words,
            batch_size:       a.batch_size,
            epochs:           a.epochs,
            learning_rate:    a.lr,
            validation_split: a.validation_split,
            runs:             a.runs,
            seed:             a.seed,
            lstm_size:        a.lstm_size,
            dropout:          a.dropout,
            architecture:     a.architecture,
            rich_context:     a.rich_context,
            report:           a.report,
            show_errors:      a.show_errors,
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Corpus file in the training format (labels are used for accuracy)
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Which training run's weights to use
    #[arg(long, default_value_t = 1)]
    pub run: usize,

    /// Cache file; defaults to the one recorded at training time
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Where to write "id<TAB>label" lines; stdout if omitted
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BaselineArgs {
    #[arg(long, default_value = "data/dev.tsv")]
    pub dev_file: PathBuf,

    #[arg(long, default_value = "data/test.tsv")]
    pub test_file: PathBuf,

    #[arg(long, default_value_t = 3)]
    pub runs: usize,

    /// Run i uses seed + i, as in `train`
    #[arg(long, default_value_t = 12345)]
    pub seed: u64,

    /// Also write the full report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DissimilarArgs {
    /// Lines of "stance<TAB>reasonId<TAB>gist"
    pub input: PathBuf,

    /// Lines of "reasonId<TAB>reasonId"
    pub output: PathBuf,

    #[arg(long, default_value = "embeddings_cache_file_word2vec.bin.gz")]
    pub cache: PathBuf,
}
