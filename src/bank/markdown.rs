use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;

use super::record::{RawMcq, RawSubjective};
use super::RawBank;

lazy_static! {
    static ref SECTION_REGEX: Regex = Regex::new(r"^##\s+(.+?)\s*$").unwrap();
    static ref QUESTION_REGEX: Regex = Regex::new(r"^\*\*(.+?)\*\*$").unwrap();
    static ref OPTION_REGEX: Regex = Regex::new(r"^-\s+(.+)$").unwrap();
    static ref ANSWER_REGEX: Regex = Regex::new(r"^\*Answer:\*\s*(.*)$").unwrap();
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    Mcq,
    Subjective,
    Other,
}

impl Section {
    fn from_title(title: &str) -> Section {
        let title = title.to_lowercase();
        match title.as_str() {
            "mcq" | "multiple choice" => Section::Mcq,
            "subjective" | "short answer" => Section::Subjective,
            _ => Section::Other,
        }
    }
}

#[derive(Default)]
struct Reader {
    bank: RawBank,
    mcq: Option<RawMcq>,
    subjective: Option<(String, Vec<String>)>,
}

impl Reader {
    fn flush(&mut self) {
        if let Some(mcq) = self.mcq.take() {
            self.bank.mcq.push(mcq);
        }
        if let Some((question, lines)) = self.subjective.take() {
            self.bank.subjective.push(RawSubjective {
                question: Some(question),
                answer: Some(lines.join("\n").trim().to_owned()),
                ..Default::default()
            });
        }
    }

    fn mcq_line(&mut self, line: &str) {
        if let Some(captures) = QUESTION_REGEX.captures(line) {
            self.flush();
            self.mcq = Some(RawMcq {
                question: Some(captures[1].trim().to_owned()),
                ..Default::default()
            });
            return;
        }
        if let Some(mcq) = self.mcq.as_mut() {
            if let Some(captures) = OPTION_REGEX.captures(line) {
                mcq.options.push(captures[1].trim().to_owned());
            } else if let Some(captures) = ANSWER_REGEX.captures(line) {
                mcq.answer = Some(captures[1].trim().to_owned());
            }
        }
    }

    // Everything up to the next question or heading is the answer
    fn subjective_line(&mut self, line: &str) {
        if let Some(captures) = QUESTION_REGEX.captures(line) {
            self.flush();
            self.subjective = Some((captures[1].trim().to_owned(), Vec::new()));
        } else if let Some((_, lines)) = self.subjective.as_mut() {
            lines.push(line.to_owned());
        }
    }
}

/// Reads a bank written as a Markdown document:
///
/// ```text
/// ## MCQ
/// **What is 2+2?**
/// - 3
/// - 4
/// *Answer:* 4
///
/// ## Subjective
/// **Explain overfitting.**
/// The model learns noise.
/// ```
///
/// Markdown carries static records only, with default marks.
pub fn read(content: &str) -> Result<RawBank> {
    let mut reader = Reader::default();
    let mut section = Section::Other;
    let mut has_sections = false;

    for line in content.lines() {
        let line = line.trim();
        if let Some(captures) = SECTION_REGEX.captures(line) {
            reader.flush();
            section = Section::from_title(&captures[1]);
            has_sections |= section != Section::Other;
            continue;
        }
        match section {
            Section::Mcq => reader.mcq_line(line),
            Section::Subjective => reader.subjective_line(line),
            Section::Other => (),
        }
    }
    reader.flush();

    if !has_sections {
        return Err(anyhow!(
            "Markdown bank needs a `## MCQ` or `## Subjective` section"
        ));
    }
    Ok(reader.bank)
}
