//! Runs one simulation per candidate switch day.
//!
//! Every switch day gets its own fork of the canonical country. Forks share
//! nothing mutable, so the slice of forks is split in halves recursively and
//! the halves run on rayon's pool.

use crate::country::Country;
use serde::Serialize;
use tracing::instrument;

/// At or below this many forks a range runs on the current thread.
pub const SPLIT_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    #[default]
    Parallel,
    /// Same recursion, both halves on the calling thread.
    Sequential,
}

/// Final figures per switch day, indexed by switch day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepResults {
    pub military_production: Vec<f64>,
    pub civilian_factories: Vec<u32>,
    pub military_factories: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub switch_day: u32,
    /// Switch day in years from the start, for plotting.
    pub switch_year: f64,
    pub military_production: f64,
    pub civilian_factories: u32,
    pub military_factories: u32,
}

impl SweepResults {
    pub fn len(&self) -> usize {
        self.military_production.len()
    }

    pub fn is_empty(&self) -> bool {
        self.military_production.is_empty()
    }

    pub fn point(&self, switch_day: usize) -> Option<SweepPoint> {
        Some(SweepPoint {
            switch_day: switch_day as u32,
            switch_year: switch_day as f64 / 365.0,
            military_production: *self.military_production.get(switch_day)?,
            civilian_factories: *self.civilian_factories.get(switch_day)?,
            military_factories: *self.military_factories.get(switch_day)?,
        })
    }

    pub fn points(&self) -> impl Iterator<Item = SweepPoint> + '_ {
        (0..self.len()).filter_map(|day| self.point(day))
    }

    /// The switch day with the most production; the earliest one on ties.
    pub fn best_switch_day(&self) -> Option<SweepPoint> {
        self.points().fold(None, |best, point| match best {
            Some(b) if b.military_production >= point.military_production => Some(b),
            _ => Some(point),
        })
    }
}

/// Calls `work(index, item)` for every item, splitting the slice in halves
/// until a piece is at most `threshold` long. Each item is touched by exactly
/// one call, so results written through `item` land in disjoint slots.
pub fn split_join<T, F>(
    items: &mut [T],
    first_index: usize,
    threshold: usize,
    parallelism: Parallelism,
    work: &F,
) where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    if items.len() <= threshold.max(1) {
        for (offset, item) in items.iter_mut().enumerate() {
            work(first_index + offset, item);
        }
        return;
    }

    let mid = items.len() / 2;
    let (left, right) = items.split_at_mut(mid);
    match parallelism {
        Parallelism::Parallel => {
            rayon::join(
                || split_join(left, first_index, threshold, parallelism, work),
                || split_join(right, first_index + mid, threshold, parallelism, work),
            );
        }
        Parallelism::Sequential => {
            split_join(left, first_index, threshold, parallelism, work);
            split_join(right, first_index + mid, threshold, parallelism, work);
        }
    }
}

pub fn run_sweep(canonical: &Country, duration: u32) -> SweepResults {
    run_sweep_with(canonical, duration, Parallelism::Parallel)
}

/// Forks `canonical` once per switch day in `0..duration` and runs each
/// fork for `duration` days. Runs on the current rayon pool; wrap the call in
/// `ThreadPool::install` to pick the thread count.
#[instrument(skip_all, name = "sweep", fields(country = canonical.name(), duration = duration))]
pub fn run_sweep_with(
    canonical: &Country,
    duration: u32,
    parallelism: Parallelism,
) -> SweepResults {
    let mut forks: Vec<Country> = {
        let _span = tracing::info_span!("fork", count = duration).entered();
        (0..duration).map(|_| canonical.fork()).collect()
    };

    {
        let _span = tracing::info_span!("simulate").entered();
        split_join(
            &mut forks,
            0,
            SPLIT_THRESHOLD,
            parallelism,
            &|switch_day, country: &mut Country| {
                country.calculate_results(switch_day as u32, duration);
            },
        );
    }

    let mut results = SweepResults {
        military_production: Vec::with_capacity(forks.len()),
        civilian_factories: Vec::with_capacity(forks.len()),
        military_factories: Vec::with_capacity(forks.len()),
    };
    for country in &forks {
        results.military_production.push(country.military_production());
        results.civilian_factories.push(country.civilian_factories());
        results.military_factories.push(country.military_factories());
    }

    if let Some(best) = results.best_switch_day() {
        log::info!(
            "{}: best switch day {} ({:.2} years), {:.1} production",
            canonical.name(),
            best.switch_day,
            best.switch_year,
            best.military_production
        );
    }
    results
}
