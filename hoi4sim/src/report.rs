//! CSV output for sweeps and single runs.

use hoi4sim_core::{Date, DaySnapshot, SweepResults};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct SweepRow {
    switch_day: u32,
    switch_date: String,
    switch_year: f64,
    military_production: f64,
    civilian_factories: u32,
    military_factories: u32,
}

#[derive(Debug, Serialize)]
struct RunRow {
    day: u32,
    date: String,
    military_production: f64,
    civilian_factories: u32,
    military_factories: u32,
    economy_level: usize,
}

/// One row per switch day.
pub fn write_sweep_csv<W: Write>(
    writer: W,
    results: &SweepResults,
    start: Date,
) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in results.points() {
        wtr.serialize(SweepRow {
            switch_day: point.switch_day,
            switch_date: start.add_days(point.switch_day).to_string(),
            switch_year: point.switch_year,
            military_production: point.military_production,
            civilian_factories: point.civilian_factories,
            military_factories: point.military_factories,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per simulated day.
pub fn write_run_csv<W: Write>(writer: W, days: &[DaySnapshot], start: Date) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for snapshot in days {
        wtr.serialize(RunRow {
            day: snapshot.day,
            date: start.add_days(snapshot.day).to_string(),
            military_production: snapshot.military_production,
            civilian_factories: snapshot.civilian_factories,
            military_factories: snapshot.military_factories,
            economy_level: snapshot.economy_level,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
