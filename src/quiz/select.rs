use rand::seq::index;
use rand::Rng;
use std::convert::TryFrom;

use super::QuizError;

/// Picks `count` elements without replacement.
///
/// An absent count takes the whole pool in authored order without drawing
/// from `rng`. A count larger than the pool is clamped; a negative count is
/// rejected. The order of a sample is whatever the sampler produced, so
/// presentation order is shuffled separately by the caller.
pub fn select<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    pool: &'a [T],
    count: Option<i64>,
) -> Result<Vec<&'a T>, QuizError> {
    let count = match count {
        None => return Ok(pool.iter().collect()),
        Some(requested) if requested < 0 => return Err(QuizError::Selection { requested }),
        Some(requested) => usize::try_from(requested)
            .unwrap_or(usize::MAX)
            .min(pool.len()),
    };

    Ok(index::sample(rng, pool.len(), count)
        .into_iter()
        .map(|i| &pool[i])
        .collect())
}
