use anyhow::{anyhow, Result};
use std::path::PathBuf;

mod args;
mod generate;
mod inspect;


use args::Args;
pub use generate::GenerateOptions;

pub const USAGE: &'static str = "\
Usage:
  quizset generate BANK [--seed N] [--sets N] [--mcq N] [--subjective N]
                        [--template KEY] [--output-dir DIR] [--no-pdf]
                        [--per-set-seeds] [--config FILE]
  quizset validate BANK
  quizset stats BANK
  quizset list-templates

BANK is a .yaml, .yml, .json or .csv question bank.
Set RUST_LOG=debug for more detailed logs.";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Generate(GenerateOptions),
    Validate(PathBuf),
    Stats(PathBuf),
    ListTemplates,
    Help,
}

fn bank_path(args: &mut Args, command: &str) -> Result<PathBuf> {
    let path = args
        .next()
        .ok_or_else(|| anyhow!("`{}` needs a question bank file", command))?;
    if let Some(extra) = args.next() {
        return Err(anyhow!("Unexpected argument `{}`", extra));
    }
    Ok(PathBuf::from(path))
}

/// Parses the words following the program name.
pub fn parse<I: IntoIterator<Item = String>>(words: I) -> Result<Command> {
    let mut args = Args::new(words);
    let command = match args.next() {
        Some(command) => command,
        None => return Ok(Command::Help),
    };

    match command.as_str() {
        "generate" => Ok(Command::Generate(GenerateOptions::parse(&mut args)?)),
        "validate" => Ok(Command::Validate(bank_path(&mut args, "validate")?)),
        "stats" => Ok(Command::Stats(bank_path(&mut args, "stats")?)),
        "list-templates" => Ok(Command::ListTemplates),
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => Err(anyhow!("Unknown command `{}`\n\n{}", other, USAGE)),
    }
}

pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Generate(options) => generate::generate(&options),
        Command::Validate(path) => inspect::validate(&path),
        Command::Stats(path) => inspect::stats(&path),
        Command::ListTemplates => {
            println!("{}", inspect::list_templates());
            Ok(())
        }
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}
