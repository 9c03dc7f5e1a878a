// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. It uses the `clap`
// crate to parse command line arguments; the work itself is
// delegated to Layer 2 (application) or, for the two file
// preparation commands, to Layer 6 (infra).
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{
    BaselineArgs, BuildCacheArgs, Commands, ConvertArgs, DissimilarArgs, PredictArgs, TrainArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "arc",
    version = "0.1.0",
    about = "Argument reasoning comprehension: pick the warrant that links a reason to its claim."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::BuildCache(args)      => run_build_cache(args),
            Commands::ConvertWord2vec(args) => run_convert(args),
            Commands::Train(args)           => run_train(args),
            Commands::Predict(args)         => run_predict(args),
            Commands::Baseline(args)        => run_baseline(args),
            Commands::Dissimilar(args)      => run_dissimilar(args),
        }
    }
}

fn run_build_cache(args: BuildCacheArgs) -> Result<()> {
    use crate::infra::embeddings_cache::prepare_cache;

    let cache = prepare_cache(&args.input_dirs, &args.output, &args.embeddings, args.format)?;
    println!(
        "Cache written to '{}': {} words, {} with vectors",
        args.output.display(),
        cache.frequencies.len(),
        cache.vectors.len()
    );
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    use crate::infra::embeddings_file::convert_word2vec_binary;

    let count = convert_word2vec_binary(&args.input, &args.output)?;
    println!("Converted {} vectors to '{}'", count, args.output.display());
    Ok(())
}

/// Converts CLI args into a TrainConfig and hands off to Layer 2.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.train_file.display());
    let use_case = TrainUseCase::new(args.into());
    use_case.execute()?;
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(args.checkpoint_dir, args.input, args.run, args.cache, args.output);
    use_case.execute()?;
    Ok(())
}

fn run_baseline(args: BaselineArgs) -> Result<()> {
    use crate::application::baseline_use_case::BaselineUseCase;

    BaselineUseCase::new(args.dev_file, args.test_file, args.runs, args.seed, args.report).execute()?;
    Ok(())
}

fn run_dissimilar(args: DissimilarArgs) -> Result<()> {
    use crate::application::dissimilar_use_case::DissimilarUseCase;

    let pairs = DissimilarUseCase::new(args.input, &args.output, args.cache).execute()?;
    println!("{} pairs saved to '{}'", pairs.len(), args.output.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::ml::model::Architecture;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["arc", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let default = TrainConfig::default();

        assert_eq!(cfg.max_len, default.max_len);
        assert_eq!(cfg.epochs, default.epochs);
        assert_eq!(cfg.runs, default.runs);
        assert_eq!(cfg.architecture, default.architecture);
        assert_eq!(cfg.rich_context, default.rich_context);
        assert_eq!(cfg.cache_file, default.cache_file);
        assert_eq!(cfg.learning_rate, default.learning_rate);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "arc", "train", "--architecture", "attention", "--rich-context", "false", "--runs", "1",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(args.architecture, Architecture::Attention);
        assert!(!args.rich_context);
        assert_eq!(args.runs, 1);
    }

    #[test]
    fn test_baseline_shares_the_train_seed() {
        let cli = Cli::try_parse_from(["arc", "baseline", "--runs", "10"]).unwrap();
        let Commands::Baseline(args) = cli.command else { panic!("expected baseline") };
        assert_eq!(args.runs, 10);
        assert_eq!(args.seed, TrainConfig::default().seed);
        assert_eq!(args.dev_file, TrainConfig::default().dev_file);
    }

    #[test]
    fn test_build_cache_needs_an_input_dir() {
        assert!(Cli::try_parse_from(["arc", "build-cache", "out.bin.gz", "vectors.txt"]).is_err());
        let cli = Cli::try_parse_from([
            "arc", "build-cache", "out.bin.gz", "vectors.bin.gz", "data", "--format", "word2vec-bin",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::BuildCache(_)));
    }
}
