use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use std::io::Read;

use super::record::{RawMcq, RawSubjective};
use super::RawBank;

struct Columns {
    kind: Option<usize>,
    question: Option<usize>,
    answer: Option<usize>,
    solution: Option<usize>,
    marks: Option<usize>,
    options: Vec<usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        Columns {
            kind: find("type"),
            question: find("question"),
            answer: find("answer"),
            solution: find("solution"),
            marks: find("marks"),
            options: headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.to_lowercase().starts_with("option"))
                .map(|(index, _)| index)
                .collect(),
        }
    }
}

fn cell<'a>(record: &'a StringRecord, column: Option<usize>) -> &'a str {
    column.and_then(|index| record.get(index)).unwrap_or("")
}

fn non_blank(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Reads a spreadsheet export. Option columns are kept in header order.
pub fn read<R: Read>(reader: R) -> Result<RawBank> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::new(csv_reader.headers()?);
    if columns.question.is_none() {
        return Err(anyhow!("CSV bank needs a `question` column"));
    }

    let mut bank = RawBank::default();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Could not read CSV row {}", row + 2))?;

        let question = cell(&record, columns.question);
        if question.is_empty() {
            continue;
        }

        let marks = match cell(&record, columns.marks) {
            "" => None,
            marks => Some(
                marks
                    .parse::<i64>()
                    .with_context(|| format!("Invalid marks on CSV row {}", row + 2))?,
            ),
        };

        let options: Vec<String> = columns
            .options
            .iter()
            .filter_map(|index| record.get(*index))
            .filter_map(non_blank)
            .collect();

        let is_mcq = cell(&record, columns.kind).to_lowercase().starts_with("mcq");
        if is_mcq || !options.is_empty() {
            bank.mcq.push(RawMcq {
                question: Some(question.to_owned()),
                options,
                answer: non_blank(cell(&record, columns.answer)),
                marks,
                ..Default::default()
            });
        } else {
            let answer = non_blank(cell(&record, columns.answer))
                .or_else(|| non_blank(cell(&record, columns.solution)));
            bank.subjective.push(RawSubjective {
                question: Some(question.to_owned()),
                answer,
                marks,
                ..Default::default()
            });
        }
    }

    Ok(bank)
}
