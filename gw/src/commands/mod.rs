mod check;
mod completions;
mod generate;

use std::path::PathBuf;

use check::CheckCommand;
use clap::{ArgAction, Args, Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;
use gwgen_codegen::{Generator, GeneratorOptions};
use gwgen_descriptor::Registry;

/// Extension trait for exiting on diagnostic errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for gwgen_descriptor::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for gwgen_codegen::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "gwgen")]
#[command(version)]
#[command(about = "Generate grpc-gateway reverse-proxy code from service descriptors")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate .pb.gw.go files
    Generate(GenerateCommand),

    /// Validate descriptors and options without writing files
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Descriptor input and generator options shared by commands.
#[derive(Args)]
pub(crate) struct InputArgs {
    /// Path to the JSON descriptor request
    #[arg(short, long)]
    pub input: PathBuf,

    /// Generator parameters (e.g. "paths=source_relative,standalone=true")
    #[arg(short, long)]
    pub param: Option<String>,

    /// Path to a gwgen.toml with default options
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl InputArgs {
    /// Load the descriptor registry.
    pub fn registry(&self) -> Registry {
        Registry::from_file(&self.input).unwrap_or_exit()
    }

    /// Build options: config file, then the request's parameter, then `--param`.
    pub fn options(&self, registry: &Registry) -> GeneratorOptions {
        let mut options = match &self.config {
            Some(path) => GeneratorOptions::from_file(path).unwrap_or_exit(),
            None => GeneratorOptions::default(),
        };
        for parameter in [registry.parameter(), self.param.as_deref()]
            .into_iter()
            .flatten()
        {
            options.apply_parameter(parameter).unwrap_or_exit();
        }
        options
    }

    /// Build a generator, exiting on invalid path options.
    pub fn generator<'r>(&self, registry: &'r Registry) -> Generator<'r> {
        let options = self.options(registry);
        Generator::from_registry(registry, options).unwrap_or_exit()
    }
}
