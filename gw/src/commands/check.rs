use clap::Args;
use eyre::Result;

use super::{InputArgs, UnwrapOrExit};
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub input: InputArgs,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let registry = self.input.registry();
        let generator = self.input.generator(&registry);
        let targets = registry.targets();
        let files = generator.generate(targets.iter().copied()).unwrap_or_exit();

        let report = ops::check(&self.input.input, &targets, &files);
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
