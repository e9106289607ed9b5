use anyhow::Result;
use std::path::Path;

use crate::quiz::QuizSet;

mod compiler;
mod latex;
mod layout;
#[cfg(test)]
pub mod mock;


pub use compiler::PdfLatex;
pub use latex::LatexRenderer;
pub use layout::Layout;

/// Outcome of turning document source into its final artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompileReport {
    pub success: bool,
    /// Everything the toolchain printed, kept for diagnosing failures.
    pub log: String,
}

impl CompileReport {
    pub fn success(log: String) -> Self {
        CompileReport { success: true, log }
    }

    pub fn failure(log: String) -> Self {
        CompileReport {
            success: false,
            log,
        }
    }
}

pub trait DocumentRenderer {
    fn render(&self, quiz_set: &QuizSet, layout: &Layout) -> Result<String>;
}

pub trait DocumentCompiler {
    fn compile(&self, source: &Path, output_dir: &Path) -> CompileReport;
}
