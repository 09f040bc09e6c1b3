mod complete;
mod grow;
mod seed;

pub use complete::CompletePlanner;
pub use grow::GrowPlanner;
pub use seed::{SeedPlanner, SeedStage};

/// Highest-scoring candidate; the first one wins ties.
fn best_of<T>(candidates: impl IntoIterator<Item = (T, f64)>) -> Option<(T, f64)> {
    candidates
        .into_iter()
        .fold(None, |best: Option<(T, f64)>, (item, score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((item, score)),
        })
}

/// Keeps `best` only if it strictly clears `threshold`.
fn clearing<T>(best: Option<(T, f64)>, threshold: f64) -> Option<(T, f64)> {
    best.filter(|(_, score)| *score > threshold)
}
