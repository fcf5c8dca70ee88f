use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::{InputArgs, UnwrapOrExit};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Preview generated code without writing to disk
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let registry = self.input.registry();
        let generator = self.input.generator(&registry);
        let files = generator.generate(registry.targets()).unwrap_or_exit();

        let report = if self.dry_run {
            ops::preview(files)
        } else {
            ops::write(files, &self.output)?
        };
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
