use anyhow::{anyhow, Result};
use std::path::PathBuf;

use super::args::Args;
use crate::bank::QuestionBank;
use crate::config::{SeedStrategy, Settings};
use crate::output::{LatexRenderer, PdfLatex};
use crate::run::{self, SetStatus};

/// Flags of the `generate` command. Anything left unset falls back to the settings file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerateOptions {
    pub bank: PathBuf,
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub sets: Option<u32>,
    pub mcq: Option<i64>,
    pub subjective: Option<i64>,
    pub template: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub no_pdf: bool,
    pub per_set_seeds: bool,
}

impl GenerateOptions {
    pub fn parse(args: &mut Args) -> Result<GenerateOptions> {
        let mut options = GenerateOptions::default();
        let mut bank = None;
        while let Some(word) = args.next() {
            match word.as_str() {
                "--seed" => options.seed = Some(args.single(&word)?),
                "--sets" => options.sets = Some(args.single(&word)?),
                "--mcq" => options.mcq = Some(args.single(&word)?),
                "--subjective" => options.subjective = Some(args.single(&word)?),
                "--template" => options.template = Some(args.value(&word)?),
                "--output-dir" => options.output_dir = Some(PathBuf::from(args.value(&word)?)),
                "--config" => options.config = Some(PathBuf::from(args.value(&word)?)),
                "--no-pdf" => options.no_pdf = true,
                "--per-set-seeds" => options.per_set_seeds = true,
                flag if flag.starts_with("--") => {
                    return Err(anyhow!("Unknown option `{}`", flag));
                }
                _ if bank.is_some() => return Err(anyhow!("Unexpected argument `{}`", word)),
                _ => bank = Some(PathBuf::from(&word)),
            }
        }
        options.bank = bank.ok_or_else(|| anyhow!("`generate` needs a question bank file"))?;
        Ok(options)
    }

    /// Flags given on the command line win over the settings file.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(sets) = self.sets {
            settings.sets = sets;
        }
        if let Some(mcq) = self.mcq {
            settings.num_mcq = Some(mcq);
        }
        if let Some(subjective) = self.subjective {
            settings.num_subjective = Some(subjective);
        }
        if let Some(template) = &self.template {
            settings.layout = template.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }
        if self.no_pdf {
            settings.compile_pdf = false;
        }
        if self.per_set_seeds {
            settings.seed_strategy = SeedStrategy::PerSet;
        }
        settings
    }
}

pub fn generate(options: &GenerateOptions) -> Result<()> {
    let settings = options.apply(Settings::load(options.config.as_deref())?);
    let bank = QuestionBank::open(&options.bank)?;
    let compiler = PdfLatex::new(&settings.latex_command, settings.compile_passes);

    let report = run::generate(&bank, &settings, &LatexRenderer::new(), &compiler)?;

    for outcome in &report.sets {
        let status = match &outcome.status {
            SetStatus::Written => "written".to_owned(),
            SetStatus::Compiled => "compiled".to_owned(),
            SetStatus::CompileFailed { .. } => "compilation failed".to_owned(),
            SetStatus::Failed { reason } => format!("failed: {}", reason),
        };
        println!("Quiz set {}: {}", outcome.set_id, status);
    }
    println!("Seed: {}", report.seed);

    if report.is_success() {
        println!(
            "Successfully generated {} quiz sets in {:?}",
            report.sets.len(),
            settings.output_dir
        );
        Ok(())
    } else {
        Err(anyhow!(
            "Some errors occurred during generation (quiz sets {:?})",
            report.failed_sets()
        ))
    }
}
