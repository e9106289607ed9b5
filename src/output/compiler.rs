use log::debug;
use std::path::Path;
use std::process::Command;

use super::{CompileReport, DocumentCompiler};

/// Runs a LaTeX engine on a generated source file.
///
/// The engine is invoked `passes` times so cross-references settle. A missing
/// binary or a non-zero exit stops immediately; failures are never retried.
#[derive(Clone, Debug)]
pub struct PdfLatex {
    command: String,
    passes: u32,
}

impl PdfLatex {
    pub fn new(command: &str, passes: u32) -> Self {
        PdfLatex {
            command: command.to_owned(),
            passes: passes.max(1),
        }
    }
}

impl Default for PdfLatex {
    fn default() -> Self {
        PdfLatex::new("pdflatex", 2)
    }
}

impl DocumentCompiler for PdfLatex {
    fn compile(&self, source: &Path, output_dir: &Path) -> CompileReport {
        let mut log = String::new();
        for pass in 1..=self.passes {
            debug!("{} pass {} on {:?}", self.command, pass, source);
            let output = Command::new(&self.command)
                .arg("-interaction=nonstopmode")
                .arg(format!("-output-directory={}", output_dir.display()))
                .arg(source)
                .output();

            let output = match output {
                Ok(output) => output,
                Err(e) => {
                    log.push_str(&format!("Could not run `{}`: {}", self.command, e));
                    return CompileReport::failure(log);
                }
            };

            log.push_str(&String::from_utf8_lossy(&output.stdout));
            log.push_str(&String::from_utf8_lossy(&output.stderr));
            if !output.status.success() {
                log.push_str(&format!(
                    "\n`{}` exited with {} on pass {}",
                    self.command, output.status, pass
                ));
                return CompileReport::failure(log);
            }
        }
        CompileReport::success(log)
    }
}
