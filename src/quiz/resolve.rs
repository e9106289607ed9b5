use rand::seq::SliceRandom;
use rand::Rng;

use super::{describe, QuizError, ResolvedSubjective};
use crate::bank::record::variant_answer;
use crate::bank::{McqRecord, SubjectiveRecord};
use crate::template::{self, TemplateError, VariableSet};

/// An MCQ whose text is final but whose options are still in authored order.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcreteMcq {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub marks: u32,
}

pub fn mcq_variant(
    template: &str,
    options: &[String],
    answer: &str,
    variables: &VariableSet,
    marks: u32,
) -> Result<ConcreteMcq, TemplateError> {
    Ok(ConcreteMcq {
        question: template::resolve(template, variables)?,
        options: options
            .iter()
            .map(|option| template::resolve(option, variables))
            .collect::<Result<Vec<String>, TemplateError>>()?,
        answer: template::resolve(answer, variables)?,
        marks,
    })
}

fn choose_variant<'a, R: Rng + ?Sized>(
    rng: &mut R,
    text: &str,
    variables: &'a [VariableSet],
) -> Result<&'a VariableSet, QuizError> {
    variables.choose(rng).ok_or_else(|| QuizError::NoVariables {
        question: describe(text),
    })
}

/// Static records pass through; templated records draw one variable set.
pub fn resolve_mcq<R: Rng + ?Sized>(
    rng: &mut R,
    record: &McqRecord,
) -> Result<ConcreteMcq, QuizError> {
    match record {
        McqRecord::Static {
            question,
            options,
            answer,
            marks,
        } => Ok(ConcreteMcq {
            question: question.clone(),
            options: options.clone(),
            answer: answer.clone(),
            marks: *marks,
        }),
        McqRecord::Templated {
            template,
            options,
            answer,
            variables,
            marks,
        } => {
            let chosen = choose_variant(rng, template, variables)?;
            mcq_variant(template, options, answer, chosen, *marks).map_err(|source| {
                QuizError::Template {
                    question: describe(template),
                    source,
                }
            })
        }
    }
}

/// Templated subjective answers are taken verbatim from the chosen variable set.
pub fn resolve_subjective<R: Rng + ?Sized>(
    rng: &mut R,
    record: &SubjectiveRecord,
) -> Result<ResolvedSubjective, QuizError> {
    match record {
        SubjectiveRecord::Static {
            question,
            answer,
            marks,
        } => Ok(ResolvedSubjective {
            question: question.clone(),
            answer: answer.clone(),
            parts: Vec::new(),
            marks: *marks,
        }),
        SubjectiveRecord::MultiPart {
            question,
            answer,
            parts,
            marks,
        } => Ok(ResolvedSubjective {
            question: question.clone(),
            answer: answer.clone(),
            parts: parts.clone(),
            marks: *marks,
        }),
        SubjectiveRecord::Templated {
            template,
            variables,
            marks,
        } => {
            let chosen = choose_variant(rng, template, variables)?;
            let template_error = |source| QuizError::Template {
                question: describe(template),
                source,
            };
            let question = template::resolve(template, chosen).map_err(template_error)?;
            let answer = variant_answer(chosen).ok_or_else(|| {
                template_error(TemplateError::UndefinedVariable {
                    name: "answer".to_owned(),
                    expression: "answer".to_owned(),
                })
            })?;
            Ok(ResolvedSubjective {
                question,
                answer,
                parts: Vec::new(),
                marks: *marks,
            })
        }
    }
}
