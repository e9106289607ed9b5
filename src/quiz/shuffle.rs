use rand::seq::SliceRandom;
use rand::Rng;

use super::resolve::ConcreteMcq;
use super::{describe, QuizError, ResolvedMcq};
use crate::bank::record::MAX_OPTIONS;

#[derive(Clone, Debug, PartialEq)]
pub struct ShuffledOptions {
    pub options: Vec<String>,
    /// Position of the first option equal to the answer, if any.
    pub correct_index: Option<usize>,
}

/// Label of an option position, `None` past `Z`.
pub fn letter_for(index: usize) -> Option<char> {
    if index < MAX_OPTIONS {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

/// Permutes `options` uniformly and tracks where the answer ends up.
/// Never panics: an answer that matches nothing yields `correct_index: None`.
pub fn shuffle_options<R: Rng + ?Sized>(
    rng: &mut R,
    options: Vec<String>,
    answer: &str,
) -> ShuffledOptions {
    let mut flagged: Vec<(String, bool)> = options
        .into_iter()
        .map(|option| {
            let is_answer = option == answer;
            (option, is_answer)
        })
        .collect();
    flagged.shuffle(rng);

    let correct_index = flagged.iter().position(|(_, is_answer)| *is_answer);
    ShuffledOptions {
        options: flagged.into_iter().map(|(option, _)| option).collect(),
        correct_index,
    }
}

pub fn shuffle_mcq<R: Rng + ?Sized>(
    rng: &mut R,
    mcq: ConcreteMcq,
) -> Result<ResolvedMcq, QuizError> {
    let ConcreteMcq {
        question,
        options,
        answer,
        marks,
    } = mcq;
    let count = options.len();
    if count > MAX_OPTIONS {
        return Err(QuizError::TooManyOptions {
            question: describe(&question),
            count,
        });
    }

    let shuffled = shuffle_options(rng, options, &answer);
    let correct_index = shuffled
        .correct_index
        .ok_or_else(|| QuizError::AnswerNotFound {
            question: describe(&question),
            answer: answer.clone(),
        })?;
    let correct_letter =
        letter_for(correct_index).ok_or_else(|| QuizError::TooManyOptions {
            question: describe(&question),
            count,
        })?;

    Ok(ResolvedMcq {
        question,
        options: shuffled.options,
        answer,
        correct_index,
        correct_letter,
        marks,
    })
}
