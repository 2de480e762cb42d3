//! Loaders for Hearts of Iron IV starting data.
//!
//! Produces plain [`StateSetup`] / [`CountrySetup`] records from either the
//! game's `history/` directory or the flat CSV export. The simulation engine
//! consumes these records and never sees a file format.

pub mod countries;
pub mod flat;
pub mod path;
pub mod states;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stability and war support assumed when a country file does not set them.
pub const DEFAULT_STABILITY: f64 = 0.5;
pub const DEFAULT_WAR_SUPPORT: f64 = 0.5;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: hoi4txt::ParseError,
    },
    #[error("Failed to read {path}: {source}")]
    Deserialize {
        path: PathBuf,
        source: hoi4txt::DeError,
    },
    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Bad row {line}: {reason}")]
    BadRow { line: usize, reason: String },
    #[error("{0}")]
    Invalid(String),
}

/// Starting figures for one state, as the engine needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSetup {
    pub id: u32,
    pub owner: String,
    pub infrastructure: u32,
    /// Category slots plus any flat bonus, fixed at load time.
    pub base_building_slots: u32,
    pub dockyards: u32,
    pub civilian_factories: u32,
    pub military_factories: u32,
}

/// Starting figures for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySetup {
    pub tag: String,
    pub stability: f64,
    pub war_support: f64,
    /// Ordered the way construction walks them.
    pub states: Vec<StateSetup>,
}

impl CountrySetup {
    pub fn civilian_factories(&self) -> u32 {
        self.states.iter().map(|s| s.civilian_factories).sum()
    }

    pub fn military_factories(&self) -> u32 {
        self.states.iter().map(|s| s.military_factories).sum()
    }
}

/// Highest infrastructure first, then by state id, which is the order
/// construction is handed out in.
pub fn sort_for_construction(states: &mut [StateSetup]) {
    states.sort_by(|a, b| {
        b.infrastructure
            .cmp(&a.infrastructure)
            .then(a.id.cmp(&b.id))
    });
}

/// Every country with a history file, keyed by tag.
#[derive(Debug, Default)]
pub struct GameData {
    pub countries: BTreeMap<String, CountrySetup>,
}

impl GameData {
    pub fn country(&self, tag: &str) -> Option<&CountrySetup> {
        self.countries.get(&tag.to_uppercase())
    }
}

/// Loads `history/states` and `history/countries` from a game install and
/// attaches each state to its owner.
pub fn load_game_data(game_path: &Path) -> Result<GameData, DataError> {
    let (states, (state_ok, state_fail)) = states::load_states(game_path)?;
    log::info!("Loaded {} states ({} failed)", state_ok, state_fail);

    let (histories, (country_ok, country_fail)) = countries::load_country_histories(game_path)?;
    log::info!("Loaded {} countries ({} failed)", country_ok, country_fail);

    let mut countries: BTreeMap<String, CountrySetup> = histories
        .into_iter()
        .map(|(tag, history)| {
            let setup = CountrySetup {
                tag: tag.clone(),
                stability: history.set_stability.unwrap_or(DEFAULT_STABILITY),
                war_support: history.set_war_support.unwrap_or(DEFAULT_WAR_SUPPORT),
                states: Vec::new(),
            };
            (tag, setup)
        })
        .collect();

    for state in states {
        match countries.get_mut(&state.owner) {
            Some(country) => country.states.push(state),
            None => log::debug!(
                "State {} owned by {} has no country history; dropped",
                state.id,
                state.owner
            ),
        }
    }

    for country in countries.values_mut() {
        sort_for_construction(&mut country.states);
    }

    Ok(GameData { countries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_game_data_attaches_states_to_owners() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(
            &root.join("history/countries/GER - Germany.txt"),
            "capital = 64\nset_stability = 0.6\nset_war_support = 0.3\n",
        );
        write(
            &root.join("history/countries/POL - Poland.txt"),
            "capital = 10\n",
        );
        write(
            &root.join("history/states/64-Brandenburg.txt"),
            "state = { id = 64 state_category = city history = { owner = GER buildings = { infrastructure = 4 arms_factory = 2 industrial_complex = 3 } } }",
        );
        write(
            &root.join("history/states/65-Berlin.txt"),
            "state = { id = 65 state_category = metropolis history = { owner = GER buildings = { infrastructure = 5 industrial_complex = 6 } } }",
        );
        write(
            &root.join("history/states/10-Warsaw.txt"),
            "state = { id = 10 state_category = town history = { owner = POL } }",
        );
        write(
            &root.join("history/states/99-Nowhere.txt"),
            "state = { id = 99 state_category = rural history = { owner = XXX } }",
        );

        let data = load_game_data(root).unwrap();
        assert_eq!(data.countries.len(), 2);

        let ger = data.country("ger").unwrap();
        assert!((ger.stability - 0.6).abs() < 1e-12);
        assert!((ger.war_support - 0.3).abs() < 1e-12);
        // higher infrastructure first
        assert_eq!(
            ger.states.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![65, 64]
        );
        assert_eq!(ger.civilian_factories(), 9);
        assert_eq!(ger.military_factories(), 2);

        let pol = data.country("POL").unwrap();
        assert_eq!(pol.stability, DEFAULT_STABILITY);
        assert_eq!(pol.war_support, DEFAULT_WAR_SUPPORT);
        assert_eq!(pol.states.len(), 1);
        assert_eq!(pol.states[0].base_building_slots, 4);
    }

    #[test]
    fn test_missing_history_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_game_data(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::MissingDirectory(_)));
    }

    #[test]
    fn test_sort_for_construction_is_stable_by_id() {
        let mk = |id, infrastructure| StateSetup {
            id,
            owner: "SOV".into(),
            infrastructure,
            base_building_slots: 4,
            dockyards: 0,
            civilian_factories: 0,
            military_factories: 0,
        };
        let mut states = vec![mk(3, 2), mk(1, 5), mk(2, 2)];
        sort_for_construction(&mut states);
        assert_eq!(
            states.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
