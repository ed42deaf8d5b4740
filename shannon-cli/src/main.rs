use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::{info, LevelFilter};

use shannon_core::model::builder::ShannonModels;
use shannon_core::model::generation_input::GenerationInput;
use shannon_core::Corpus;

mod report;

/// Generates Shannon's approximations to a text corpus.
#[derive(Parser, Debug)]
#[command(name = "shannon", version, about)]
struct Cli {
    /// Corpus file
    #[arg(default_value = "text.txt")]
    file: PathBuf,

    /// Order of the generalized n-gram model
    #[arg(default_value_t = 7)]
    n: usize,

    /// Length of each fixed-order character approximation
    #[arg(long, default_value_t = 100)]
    chars: usize,

    /// Character budget of the n-gram approximation
    #[arg(long = "ngram-chars", default_value_t = 500)]
    ngram_chars: usize,

    /// Character budget of each word approximation
    #[arg(long = "word-chars", default_value_t = 100)]
    word_chars: usize,

    /// Context prefix marking a sentence start for the n-gram model
    #[arg(long = "start-marker", default_value = ". ")]
    start_marker: String,

    /// Random seed, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Wrap generated text at this width (0 disables wrapping)
    #[arg(long, default_value_t = 100)]
    width: usize,

    /// Also print the digram and word transition probabilities
    #[arg(long)]
    transitions: bool,

    /// Print the whole report as JSON
    #[arg(long)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less logging (-q error, -qq off)
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,
}

impl Cli {
    /// Maps the command line onto the generation parameters.
    fn generation_input(&self) -> Result<GenerationInput> {
        let mut input = GenerationInput::default();
        input.char_length = self.chars;
        input.ngram_length = self.ngram_chars;
        input.word_budget = self.word_chars;
        input.seed = self.seed;
        input.set_ngram_order(self.n)?;
        input.set_start_marker(&self.start_marker)?;
        Ok(input)
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match (quiet, verbose) {
        (0, 0) => LevelFilter::Warn,
        (0, 1) => LevelFilter::Debug,
        (0, _) => LevelFilter::Trace,
        (1, _) => LevelFilter::Error,
        _ => LevelFilter::Off,
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if verbose > 0 || quiet > 0 {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let input = cli.generation_input()?;
    let corpus = Corpus::from_file(&cli.file)
        .with_context(|| format!("failed to read corpus '{}'", cli.file.display()))?;
    info!("'{}' opened as corpus '{}'", cli.file.display(), corpus.name().unwrap_or_default());

    let models = ShannonModels::build(&corpus, input.ngram_order());
    let mut rng = input.rng();
    let outputs = models.generate(&input, &mut rng);

    let run = report::RunReport::new(&cli.file, &corpus, &models, &input, outputs, cli.transitions);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", run.render(cli.width));
    }
    Ok(())
}
