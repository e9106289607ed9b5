use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

mod markdown;
pub mod record;
mod spreadsheet;
mod validation;

#[cfg(test)]
mod tests;

pub use record::{McqRecord, Part, RawMcq, RawSubjective, RecordError, SubjectiveRecord};
pub use validation::ValidationReport;

#[derive(Debug, Default, Deserialize)]
pub struct RawBank {
    #[serde(default, alias = "multiple_choice")]
    pub mcq: Vec<RawMcq>,
    #[serde(default, alias = "short_answer")]
    pub subjective: Vec<RawSubjective>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Yaml,
    Json,
    Csv,
    Markdown,
}

impl Format {
    pub fn detect(path: &Path) -> Result<Format> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            "md" | "markdown" => Ok(Format::Markdown),
            _ => Err(anyhow!(
                "Unsupported question bank format {:?} (expected .yaml, .yml, .json, .csv or .md)",
                path
            )),
        }
    }
}

/// Immutable input of a generation run: MCQs and subjective questions in authored order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuestionBank {
    pub mcq: Vec<McqRecord>,
    pub subjective: Vec<SubjectiveRecord>,
}

impl QuestionBank {
    pub fn open(source: &Path) -> Result<QuestionBank> {
        let format = Format::detect(source)?;
        let mut file =
            File::open(source).with_context(|| format!("Could not open {:?}", source))?;
        let bank = match format {
            Format::Csv => QuestionBank::from_csv_reader(file),
            Format::Yaml | Format::Json | Format::Markdown => {
                let mut content = String::new();
                file.read_to_string(&mut content)?;
                match format {
                    Format::Yaml => QuestionBank::from_yaml_str(&content),
                    Format::Json => QuestionBank::from_json_str(&content),
                    _ => QuestionBank::from_markdown_str(&content),
                }
            }
        }
        .with_context(|| format!("Could not load question bank {:?}", source))?;

        debug!(
            "Loaded {} MCQ and {} subjective questions from {:?}",
            bank.mcq.len(),
            bank.subjective.len(),
            source
        );
        Ok(bank)
    }

    pub fn from_yaml_str(content: &str) -> Result<QuestionBank> {
        let raw: RawBank = serde_yaml::from_str(content)?;
        QuestionBank::from_raw(raw)
    }

    pub fn from_json_str(content: &str) -> Result<QuestionBank> {
        let raw: RawBank = serde_json::from_str(content)?;
        QuestionBank::from_raw(raw)
    }

    pub fn from_markdown_str(content: &str) -> Result<QuestionBank> {
        QuestionBank::from_raw(markdown::read(content)?)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<QuestionBank> {
        QuestionBank::from_raw(spreadsheet::read(reader)?)
    }

    pub fn from_raw(raw: RawBank) -> Result<QuestionBank> {
        let mcq = raw
            .mcq
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                McqRecord::try_from(raw).with_context(|| format!("MCQ question {}", index + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        let subjective = raw
            .subjective
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                SubjectiveRecord::try_from(raw)
                    .with_context(|| format!("Subjective question {}", index + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(QuestionBank { mcq, subjective })
    }

    pub fn is_empty(&self) -> bool {
        self.mcq.is_empty() && self.subjective.is_empty()
    }

    pub fn validate(&self) -> ValidationReport {
        validation::validate(self)
    }

    pub fn stats(&self) -> BankStats {
        BankStats {
            mcq_count: self.mcq.len(),
            subjective_count: self.subjective.len(),
            templated_mcq: self.mcq.iter().filter(|q| q.is_templated()).count(),
            templated_subjective: self
                .subjective
                .iter()
                .filter(|q| matches!(q, SubjectiveRecord::Templated { .. }))
                .count(),
            multi_part_subjective: self
                .subjective
                .iter()
                .filter(|q| matches!(q, SubjectiveRecord::MultiPart { .. }))
                .count(),
            total_mcq_marks: self.mcq.iter().map(|q| u64::from(q.marks())).sum(),
            total_subjective_marks: self
                .subjective
                .iter()
                .map(|q| u64::from(q.marks()))
                .sum(),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BankStats {
    pub mcq_count: usize,
    pub subjective_count: usize,
    pub templated_mcq: usize,
    pub templated_subjective: usize,
    pub multi_part_subjective: usize,
    pub total_mcq_marks: u64,
    pub total_subjective_marks: u64,
}

impl BankStats {
    pub fn total_questions(&self) -> usize {
        self.mcq_count + self.subjective_count
    }

    pub fn total_marks(&self) -> u64 {
        self.total_mcq_marks + self.total_subjective_marks
    }
}

impl fmt::Display for BankStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "MCQ questions:        {} ({} templated, {} marks)",
            self.mcq_count, self.templated_mcq, self.total_mcq_marks
        )?;
        writeln!(
            f,
            "Subjective questions: {} ({} templated, {} multi-part, {} marks)",
            self.subjective_count,
            self.templated_subjective,
            self.multi_part_subjective,
            self.total_subjective_marks
        )?;
        write!(
            f,
            "Total:                {} questions, {} marks",
            self.total_questions(),
            self.total_marks()
        )
    }
}
