use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bank::QuestionBank;
use crate::config::{SeedStrategy, Settings};
use crate::output::{DocumentCompiler, DocumentRenderer, Layout};
use crate::quiz;


const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed of the generator dedicated to one set when sets are seeded independently.
pub fn derive_seed(seed: u64, set_id: u32) -> u64 {
    seed.wrapping_add(SEED_STRIDE.wrapping_mul(u64::from(set_id)))
}

pub fn source_file_name(set_id: u32) -> String {
    format!("quiz_set_{}.tex", set_id)
}

pub fn answer_key_file_name(set_id: u32) -> String {
    format!("answer_key_{}.txt", set_id)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SetStatus {
    /// Source and answer key were written; compilation was not requested.
    Written,
    Compiled,
    CompileFailed { log: String },
    /// Nothing was written for this set.
    Failed { reason: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetOutcome {
    pub set_id: u32,
    pub status: SetStatus,
    pub total_marks: Option<u32>,
}

impl SetOutcome {
    pub fn is_success(&self) -> bool {
        match self.status {
            SetStatus::Written | SetStatus::Compiled => true,
            SetStatus::CompileFailed { .. } | SetStatus::Failed { .. } => false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunReport {
    /// Seed that reproduces this run, whether given or drawn.
    pub seed: u64,
    pub sets: Vec<SetOutcome>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.sets.iter().all(|s| s.is_success())
    }

    pub fn failed_sets(&self) -> Vec<u32> {
        self.sets
            .iter()
            .filter(|s| !s.is_success())
            .map(|s| s.set_id)
            .collect()
    }
}

/// Generates every set of a run into `settings.output_dir`.
///
/// The bank is validated before anything is written and any validation error
/// aborts the run. After that, a failing set is logged and recorded and the
/// remaining sets are still generated.
pub fn generate<D, C>(
    bank: &QuestionBank,
    settings: &Settings,
    renderer: &D,
    compiler: &C,
) -> Result<RunReport>
where
    D: DocumentRenderer,
    C: DocumentCompiler,
{
    let layout = Layout::find(&settings.layout)?;

    let validation = bank.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid() {
        for problem in &validation.errors {
            error!("{}", problem);
        }
        return Err(anyhow!(
            "Question bank has {} error(s), no quiz set was generated",
            validation.errors.len()
        ));
    }
    if bank.is_empty() {
        warn!("Question bank is empty, quiz sets will have no questions");
    }

    fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("Could not create {:?}", settings.output_dir))?;

    let seed = match settings.seed {
        Some(seed) => {
            info!("Using random seed: {}", seed);
            seed
        }
        None => {
            let seed: u64 = StdRng::from_entropy().gen();
            info!("No seed given, using {} (pass it back to reproduce this run)", seed);
            seed
        }
    };

    info!("Generating {} quiz sets...", settings.sets);
    let context = SetContext {
        bank,
        settings,
        layout,
        renderer,
        compiler,
    };
    let mut shared_rng = StdRng::seed_from_u64(seed);
    let sets = (1..=settings.sets)
        .map(|set_id| match settings.seed_strategy {
            SeedStrategy::Shared => context.generate_set(&mut shared_rng, set_id),
            SeedStrategy::PerSet => {
                let mut rng = StdRng::seed_from_u64(derive_seed(seed, set_id));
                context.generate_set(&mut rng, set_id)
            }
        })
        .collect();

    let report = RunReport { seed, sets };
    if report.is_success() {
        info!(
            "Generated {} quiz sets in {:?}",
            report.sets.len(),
            settings.output_dir
        );
    } else {
        error!("Some quiz sets failed: {:?}", report.failed_sets());
    }
    Ok(report)
}

struct SetContext<'a, D, C> {
    bank: &'a QuestionBank,
    settings: &'a Settings,
    layout: &'a Layout,
    renderer: &'a D,
    compiler: &'a C,
}

impl<'a, D, C> SetContext<'a, D, C>
where
    D: DocumentRenderer,
    C: DocumentCompiler,
{
    fn write_set<R: Rng + ?Sized>(&self, rng: &mut R, set_id: u32) -> Result<(PathBuf, u32)> {
        let quiz_set = quiz::assemble(
            rng,
            self.bank,
            set_id,
            self.settings.num_mcq,
            self.settings.num_subjective,
        )?;
        let source = self
            .renderer
            .render(&quiz_set, self.layout)
            .context("Could not render document")?;

        let output_dir: &Path = &self.settings.output_dir;
        let source_path = output_dir.join(source_file_name(set_id));
        fs::write(&source_path, source)
            .with_context(|| format!("Could not write {:?}", source_path))?;
        let key_path = output_dir.join(answer_key_file_name(set_id));
        if let Err(e) = fs::write(&key_path, &quiz_set.answer_key) {
            // A set without its key is not left behind
            if let Err(cleanup) = fs::remove_file(&source_path) {
                warn!("Could not remove {:?}: {}", source_path, cleanup);
            }
            return Err(e).with_context(|| format!("Could not write {:?}", key_path));
        }

        Ok((source_path, quiz_set.total_marks))
    }

    fn generate_set<R: Rng + ?Sized>(&self, rng: &mut R, set_id: u32) -> SetOutcome {
        let (source_path, total_marks) = match self.write_set(rng, set_id) {
            Ok(written) => written,
            Err(e) => {
                error!("Error generating quiz set {}: {:#}", set_id, e);
                return SetOutcome {
                    set_id,
                    status: SetStatus::Failed {
                        reason: format!("{:#}", e),
                    },
                    total_marks: None,
                };
            }
        };
        info!("Generated quiz set {} ({} marks)", set_id, total_marks);

        let status = if self.settings.compile_pdf {
            let report = self
                .compiler
                .compile(&source_path, &self.settings.output_dir);
            if report.success {
                info!("Compiled quiz set {} to PDF", set_id);
                SetStatus::Compiled
            } else {
                error!("Failed to compile quiz set {}:\n{}", set_id, report.log);
                SetStatus::CompileFailed { log: report.log }
            }
        } else {
            SetStatus::Written
        };

        SetOutcome {
            set_id,
            status,
            total_marks: Some(total_marks),
        }
    }
}
