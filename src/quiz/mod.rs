use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::bank::record::MAX_OPTIONS;
use crate::bank::{Part, QuestionBank};
use crate::template::TemplateError;

mod answer_key;
pub mod resolve;
pub mod select;
pub mod shuffle;


const DESCRIPTION_LENGTH: usize = 48;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum QuizError {
    #[error("could not resolve \"{question}\": {source}")]
    Template {
        question: String,
        #[source]
        source: TemplateError,
    },
    #[error("\"{question}\" is templated but has no variable sets")]
    NoVariables { question: String },
    #[error("cannot select a negative number of questions ({requested})")]
    Selection { requested: i64 },
    #[error("answer `{answer}` of \"{question}\" does not match any option")]
    AnswerNotFound { question: String, answer: String },
    #[error("\"{question}\" has {count} options, at most {} can be labelled", MAX_OPTIONS)]
    TooManyOptions { question: String, count: usize },
    #[error("marks of quiz set {set_id} add up to more than {}", u32::MAX)]
    MarksOverflow { set_id: u32 },
}

/// Short excerpt of a question used to point at it in error messages.
pub fn describe(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= DESCRIPTION_LENGTH {
        text.to_owned()
    } else {
        let excerpt: String = text.chars().take(DESCRIPTION_LENGTH).collect();
        format!("{}...", excerpt.trim_end())
    }
}

fn checked_total(marks: impl IntoIterator<Item = u32>) -> Option<u32> {
    marks
        .into_iter()
        .try_fold(0u32, |total, marks| total.checked_add(marks))
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMcq {
    pub question: String,
    /// Options in presentation order.
    pub options: Vec<String>,
    pub answer: String,
    pub correct_index: usize,
    pub correct_letter: char,
    pub marks: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSubjective {
    pub question: String,
    pub answer: String,
    pub parts: Vec<Part>,
    pub marks: u32,
}

/// One concrete, self-consistent quiz: questions in presentation order,
/// mark totals and the answer key that matches them.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizSet {
    pub set_id: u32,
    pub mcq: Vec<ResolvedMcq>,
    pub subjective: Vec<ResolvedSubjective>,
    pub mcq_total_marks: u32,
    pub subjective_total_marks: u32,
    pub total_marks: u32,
    pub answer_key: String,
}

/// Builds one quiz set.
///
/// The order in which randomness is consumed is part of the reproducibility
/// contract and must not change:
/// 1. every templated subjective question in the bank draws its variable set,
/// 2. MCQs are sampled, then subjective questions,
/// 3. each sampled MCQ draws its variable set (if templated) then shuffles its options,
/// 4. MCQ presentation order is shuffled, then subjective presentation order.
///
/// Any failure aborts the whole set; nothing partially built is returned.
pub fn assemble<R: Rng + ?Sized>(
    rng: &mut R,
    bank: &QuestionBank,
    set_id: u32,
    num_mcq: Option<i64>,
    num_subjective: Option<i64>,
) -> Result<QuizSet, QuizError> {
    let subjective_pool = bank
        .subjective
        .iter()
        .map(|record| resolve::resolve_subjective(rng, record))
        .collect::<Result<Vec<_>, QuizError>>()?;

    let selected_mcq = select::select(rng, &bank.mcq, num_mcq)?;
    let mut subjective: Vec<ResolvedSubjective> =
        select::select(rng, &subjective_pool, num_subjective)?
            .into_iter()
            .cloned()
            .collect();

    let mut mcq = Vec::with_capacity(selected_mcq.len());
    for record in selected_mcq {
        let concrete = resolve::resolve_mcq(rng, record)?;
        mcq.push(shuffle::shuffle_mcq(rng, concrete)?);
    }

    mcq.shuffle(rng);
    subjective.shuffle(rng);

    let overflow = || QuizError::MarksOverflow { set_id };
    let mcq_total_marks = checked_total(mcq.iter().map(|q| q.marks)).ok_or_else(overflow)?;
    let subjective_total_marks =
        checked_total(subjective.iter().map(|q| q.marks)).ok_or_else(overflow)?;
    let total_marks = mcq_total_marks
        .checked_add(subjective_total_marks)
        .ok_or_else(overflow)?;

    let mut quiz_set = QuizSet {
        set_id,
        mcq,
        subjective,
        mcq_total_marks,
        subjective_total_marks,
        total_marks,
        answer_key: String::new(),
    };
    quiz_set.answer_key = answer_key::build(&quiz_set);

    debug!(
        "Assembled quiz set {} with {} MCQ and {} subjective questions ({} marks)",
        set_id,
        quiz_set.mcq.len(),
        quiz_set.subjective.len(),
        quiz_set.total_marks
    );
    Ok(quiz_set)
}
