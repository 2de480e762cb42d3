//! The flat CSV export: one row per state.
//!
//! ```text
//! country,infrastructure,building_slots,military_factories,dockyards,civilian_factories
//! SovietUnion,6,10,3,0,5
//! 0
//! ```
//!
//! A row whose first column is `0` ends the data; anything after it is ignored.

use crate::{
    CountrySetup, DEFAULT_STABILITY, DEFAULT_WAR_SUPPORT, DataError, StateSetup,
    sort_for_construction,
};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct CsvStateRow {
    pub country: String,
    pub infrastructure: u32,
    pub building_slots: u32,
    pub military_factories: u32,
    pub dockyards: u32,
    pub civilian_factories: u32,
}

fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<CsvStateRow>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = index + 2;
        if record.get(0) == Some("0") {
            break;
        }
        if record.len() < 6 {
            return Err(DataError::BadRow {
                line,
                reason: format!("expected 6 columns, found {}", record.len()),
            });
        }
        let column = |i: usize| -> Result<u32, DataError> {
            let raw = &record[i];
            raw.parse::<u32>().map_err(|e| DataError::BadRow {
                line,
                reason: format!("column {} ('{}'): {}", i + 1, raw, e),
            })
        };
        rows.push(CsvStateRow {
            country: normalize_name(&record[0]),
            infrastructure: column(1)?,
            building_slots: column(2)?,
            military_factories: column(3)?,
            dockyards: column(4)?,
            civilian_factories: column(5)?,
        });
    }
    Ok(rows)
}

pub fn load_csv(path: &Path) -> Result<Vec<CsvStateRow>, DataError> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

/// Builds a country from every row whose name matches `name` (spaces ignored).
/// The CSV carries no stability or war support, so both take their defaults.
pub fn country_from_rows(rows: &[CsvStateRow], name: &str) -> Option<CountrySetup> {
    let wanted = normalize_name(name);
    let mut states: Vec<StateSetup> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.country.eq_ignore_ascii_case(&wanted))
        .map(|(i, row)| StateSetup {
            id: i as u32 + 1,
            owner: wanted.clone(),
            infrastructure: row.infrastructure,
            base_building_slots: row.building_slots,
            dockyards: row.dockyards,
            civilian_factories: row.civilian_factories,
            military_factories: row.military_factories,
        })
        .collect();
    if states.is_empty() {
        return None;
    }
    sort_for_construction(&mut states);
    Some(CountrySetup {
        tag: wanted,
        stability: DEFAULT_STABILITY,
        war_support: DEFAULT_WAR_SUPPORT,
        states,
    })
}
