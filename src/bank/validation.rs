use std::fmt;

use super::record::MAX_OPTIONS;
use super::{McqRecord, QuestionBank, SubjectiveRecord};
use crate::lint;
use crate::quiz::resolve;
use crate::template;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, label: &str, message: impl fmt::Display) {
        self.errors.push(format!("{}: {}", label, message));
    }

    fn warning(&mut self, label: &str, message: impl fmt::Display) {
        self.warnings.push(format!("{}: {}", label, message));
    }

    fn check_answer(&mut self, label: &str, options: &[String], answer: &str) {
        if options.len() > MAX_OPTIONS {
            self.error(
                label,
                format_args!(
                    "has {} options, at most {} are supported",
                    options.len(),
                    MAX_OPTIONS
                ),
            );
        }
        match options.iter().filter(|option| *option == answer).count() {
            0 => self.error(
                label,
                format_args!("answer `{}` does not match any option", answer),
            ),
            1 => (),
            n => self.warning(
                label,
                format_args!("answer `{}` matches {} options", answer, n),
            ),
        }
    }

    fn lint<'a>(&mut self, label: &str, texts: impl IntoIterator<Item = &'a String>) {
        for text in texts {
            for finding in lint::check(text) {
                self.warning(label, finding);
            }
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "error: {}", error)?;
        }
        for warning in &self.warnings {
            writeln!(f, "warning: {}", warning)?;
        }
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Checks every record, and every variant of every templated record, up front
/// so that no quiz set can be built around a broken question.
pub fn validate(bank: &QuestionBank) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (index, record) in bank.mcq.iter().enumerate() {
        let label = format!("MCQ question {}", index + 1);
        match record {
            McqRecord::Static {
                question,
                options,
                answer,
                ..
            } => {
                report.check_answer(&label, options, answer);
                report.lint(&label, std::iter::once(question).chain(options));
            }
            McqRecord::Templated {
                template,
                options,
                answer,
                variables,
                marks,
            } => {
                for (variant, set) in variables.iter().enumerate() {
                    let label = format!("{} (variable set {})", label, variant + 1);
                    match resolve::mcq_variant(template, options, answer, set, *marks) {
                        Ok(concrete) => {
                            report.check_answer(&label, &concrete.options, &concrete.answer);
                            report.lint(
                                &label,
                                std::iter::once(&concrete.question).chain(&concrete.options),
                            );
                        }
                        Err(e) => report.error(&label, e),
                    }
                }
            }
        }
    }

    for (index, record) in bank.subjective.iter().enumerate() {
        let label = format!("Subjective question {}", index + 1);
        match record {
            SubjectiveRecord::Static { question, .. } => {
                report.lint(&label, std::iter::once(question));
            }
            SubjectiveRecord::MultiPart {
                question,
                parts,
                marks,
                ..
            } => {
                let part_marks: u64 = parts.iter().map(|p| u64::from(p.marks)).sum();
                if part_marks != u64::from(*marks) {
                    report.warning(
                        &label,
                        format_args!(
                            "parts add up to {} marks but the question is worth {}",
                            part_marks, marks
                        ),
                    );
                }
                report.lint(
                    &label,
                    std::iter::once(question).chain(parts.iter().map(|p| &p.question)),
                );
            }
            SubjectiveRecord::Templated {
                template,
                variables,
                ..
            } => {
                for (variant, set) in variables.iter().enumerate() {
                    let label = format!("{} (variable set {})", label, variant + 1);
                    match template::resolve(template, set) {
                        Ok(question) => report.lint(&label, std::iter::once(&question)),
                        Err(e) => report.error(&label, e),
                    }
                }
            }
        }
    }

    report
}
