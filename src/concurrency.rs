//! Concurrency helper: limit the number of artifacts published in parallel.

use rayon::prelude::*;

/// Run `f` over `items` with at most `limit` calls in flight.
/// `limit <= 1` is plain sequential iteration that stops at the first error.
pub fn for_each_limited<T, E, F>(items: &[T], limit: usize, f: F) -> Result<(), E>
where
    T: Sync,
    E: Send,
    F: Sync + Fn(&T) -> Result<(), E>,
{
    if limit <= 1 {
        for item in items {
            f(item)?;
        }
        return Ok(());
    }
    for chunk in items.chunks(limit) {
        chunk.par_iter().try_for_each(|item| f(item))?;
    }
    Ok(())
}
