use serde::{Deserialize, Deserializer};
use std::convert::TryFrom;
use thiserror::Error;

use crate::template::{Value, VariableSet};

pub const DEFAULT_MCQ_MARKS: i64 = 1;
pub const DEFAULT_SUBJECTIVE_MARKS: i64 = 5;
pub const DEFAULT_PART_MARKS: i64 = 1;
/// Options are labelled `A` to `Z`.
pub const MAX_OPTIONS: usize = 26;
/// Parts are labelled `a` to `z`.
pub const MAX_PARTS: usize = 26;
const VARIANT_ANSWER_KEY: &str = "answer";

/// Numbers in a bank file (`options: [3, 4, 5]`) are read as their text.
fn string_from_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.map(|value| value.to_string()))
}

fn strings_from_scalars<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(|value| value.to_string())
        .collect())
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("needs either a `question` or a `template`")]
    MissingText,
    #[error("has both a `question` and a `template`")]
    AmbiguousText,
    #[error("uses a `template` but has no `variables`")]
    MissingVariables,
    #[error("has `variables` but no `template`")]
    UnexpectedVariables,
    #[error("needs at least 2 options, found {0}")]
    TooFewOptions(usize),
    #[error("has {0} options, at most {} are supported", MAX_OPTIONS)]
    TooManyOptions(usize),
    #[error("has no `answer`")]
    MissingAnswer,
    #[error("variable set {0} has no `answer`")]
    VariantMissingAnswer(usize),
    #[error("marks must be positive, found {0}")]
    InvalidMarks(i64),
    #[error("has {0} parts, at most {} are supported", MAX_PARTS)]
    TooManyParts(usize),
    #[error("part {index} {source}")]
    Part {
        index: usize,
        #[source]
        source: Box<RecordError>,
    },
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawMcq {
    pub question: Option<String>,
    pub template: Option<String>,
    #[serde(default, deserialize_with = "strings_from_scalars")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "string_from_scalar")]
    pub answer: Option<String>,
    pub variables: Option<Vec<VariableSet>>,
    pub marks: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPart {
    pub question: Option<String>,
    #[serde(default, alias = "solution", deserialize_with = "string_from_scalar")]
    pub answer: Option<String>,
    pub marks: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawSubjective {
    pub question: Option<String>,
    pub template: Option<String>,
    #[serde(default, alias = "solution", deserialize_with = "string_from_scalar")]
    pub answer: Option<String>,
    pub variables: Option<Vec<VariableSet>>,
    pub parts: Option<Vec<RawPart>>,
    pub marks: Option<i64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum McqRecord {
    Static {
        question: String,
        options: Vec<String>,
        answer: String,
        marks: u32,
    },
    Templated {
        template: String,
        options: Vec<String>,
        answer: String,
        variables: Vec<VariableSet>,
        marks: u32,
    },
}

impl McqRecord {
    pub fn marks(&self) -> u32 {
        match self {
            McqRecord::Static { marks, .. } | McqRecord::Templated { marks, .. } => *marks,
        }
    }

    pub fn is_templated(&self) -> bool {
        match self {
            McqRecord::Templated { .. } => true,
            McqRecord::Static { .. } => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Part {
    pub question: String,
    pub answer: String,
    pub marks: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubjectiveRecord {
    Static {
        question: String,
        answer: String,
        marks: u32,
    },
    MultiPart {
        question: String,
        answer: String,
        parts: Vec<Part>,
        marks: u32,
    },
    Templated {
        template: String,
        variables: Vec<VariableSet>,
        marks: u32,
    },
}

impl SubjectiveRecord {
    pub fn marks(&self) -> u32 {
        match self {
            SubjectiveRecord::Static { marks, .. }
            | SubjectiveRecord::MultiPart { marks, .. }
            | SubjectiveRecord::Templated { marks, .. } => *marks,
        }
    }
}

fn positive_marks(marks: Option<i64>, default: i64) -> Result<u32, RecordError> {
    let marks = marks.unwrap_or(default);
    match u32::try_from(marks) {
        Ok(m) if m > 0 => Ok(m),
        _ => Err(RecordError::InvalidMarks(marks)),
    }
}

enum Text {
    Question(String),
    Template(String, Vec<VariableSet>),
}

fn split_text(
    question: Option<String>,
    template: Option<String>,
    variables: Option<Vec<VariableSet>>,
) -> Result<Text, RecordError> {
    match (question, template, variables) {
        (Some(_), Some(_), _) => Err(RecordError::AmbiguousText),
        (None, None, _) => Err(RecordError::MissingText),
        (Some(_), None, Some(_)) => Err(RecordError::UnexpectedVariables),
        (Some(question), None, None) => Ok(Text::Question(question)),
        (None, Some(_), None) => Err(RecordError::MissingVariables),
        (None, Some(_), Some(variables)) if variables.is_empty() => {
            Err(RecordError::MissingVariables)
        }
        (None, Some(template), Some(variables)) => Ok(Text::Template(template, variables)),
    }
}

impl TryFrom<RawMcq> for McqRecord {
    type Error = RecordError;

    fn try_from(raw: RawMcq) -> Result<Self, Self::Error> {
        let marks = positive_marks(raw.marks, DEFAULT_MCQ_MARKS)?;
        if raw.options.len() < 2 {
            return Err(RecordError::TooFewOptions(raw.options.len()));
        }
        if raw.options.len() > MAX_OPTIONS {
            return Err(RecordError::TooManyOptions(raw.options.len()));
        }
        let answer = raw.answer.ok_or(RecordError::MissingAnswer)?;

        Ok(match split_text(raw.question, raw.template, raw.variables)? {
            Text::Question(question) => McqRecord::Static {
                question,
                options: raw.options,
                answer,
                marks,
            },
            Text::Template(template, variables) => McqRecord::Templated {
                template,
                options: raw.options,
                answer,
                variables,
                marks,
            },
        })
    }
}

impl TryFrom<RawPart> for Part {
    type Error = RecordError;

    fn try_from(raw: RawPart) -> Result<Self, Self::Error> {
        Ok(Part {
            question: raw.question.ok_or(RecordError::MissingText)?,
            answer: raw.answer.ok_or(RecordError::MissingAnswer)?,
            marks: positive_marks(raw.marks, DEFAULT_PART_MARKS)?,
        })
    }
}

impl TryFrom<RawSubjective> for SubjectiveRecord {
    type Error = RecordError;

    fn try_from(raw: RawSubjective) -> Result<Self, Self::Error> {
        let marks = positive_marks(raw.marks, DEFAULT_SUBJECTIVE_MARKS)?;

        match split_text(raw.question, raw.template, raw.variables)? {
            Text::Template(template, variables) => {
                // Each variant carries its own authored answer
                if let Some(index) = variables
                    .iter()
                    .position(|set| !set.contains_key(VARIANT_ANSWER_KEY))
                {
                    return Err(RecordError::VariantMissingAnswer(index + 1));
                }
                Ok(SubjectiveRecord::Templated {
                    template,
                    variables,
                    marks,
                })
            }
            Text::Question(question) => {
                let answer = raw.answer.ok_or(RecordError::MissingAnswer)?;
                match raw.parts {
                    Some(parts) if parts.len() > MAX_PARTS => {
                        Err(RecordError::TooManyParts(parts.len()))
                    }
                    Some(parts) if !parts.is_empty() => {
                        let parts = parts
                            .into_iter()
                            .enumerate()
                            .map(|(index, part)| {
                                Part::try_from(part).map_err(|e| RecordError::Part {
                                    index: index + 1,
                                    source: Box::new(e),
                                })
                            })
                            .collect::<Result<Vec<Part>, RecordError>>()?;
                        Ok(SubjectiveRecord::MultiPart {
                            question,
                            answer,
                            parts,
                            marks,
                        })
                    }
                    _ => Ok(SubjectiveRecord::Static {
                        question,
                        answer,
                        marks,
                    }),
                }
            }
        }
    }
}

/// Answer text authored for one variant of a templated subjective question.
pub fn variant_answer(variables: &VariableSet) -> Option<String> {
    variables.get(VARIANT_ANSWER_KEY).map(|value| value.to_string())
}
