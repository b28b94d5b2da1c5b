//! Bounded parallel map shared by every phase.
//!
//! Each phase hands over a list of work units (files or project entries) and
//! gets one result per unit back in input order. The pool never runs more than
//! `workers` units at a time.

use rayon::prelude::*;
use tracing::warn;

/// Apply `f` to every item on at most `workers` threads.
pub fn parallel_map<T, R, F>(items: Vec<T>, workers: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    if workers <= 1 || items.len() <= 1 {
        return items.into_iter().map(f).collect();
    }
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| items.into_par_iter().map(&f).collect()),
        Err(err) => {
            warn!(%err, "thread pool unavailable, running sequentially");
            items.into_iter().map(f).collect()
        }
    }
}
