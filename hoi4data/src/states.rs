use crate::{DataError, StateSetup};
use hoi4txt::{DefaultHoi4Txt, Hoi4Txt, ParseError, from_node};
use rayon::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Industrial classification of a state; sets its shared building slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateCategory {
    Wasteland,
    Enclave,
    TinyIsland,
    Pastoral,
    SmallIsland,
    Rural,
    Town,
    LargeTown,
    City,
    LargeCity,
    Metropolis,
    Megalopolis,
}

impl StateCategory {
    pub fn building_slots(&self) -> u32 {
        match self {
            StateCategory::Wasteland | StateCategory::Enclave | StateCategory::TinyIsland => 0,
            StateCategory::Pastoral | StateCategory::SmallIsland => 1,
            StateCategory::Rural => 2,
            StateCategory::Town => 4,
            StateCategory::LargeTown => 5,
            StateCategory::City => 6,
            StateCategory::LargeCity => 8,
            StateCategory::Metropolis => 10,
            StateCategory::Megalopolis => 12,
        }
    }
}

/// `history/states/*.txt` wraps everything in a single `state = { ... }`.
#[derive(Debug, Default, Deserialize)]
pub struct StateFile {
    pub state: Option<StateDefinition>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StateDefinition {
    pub id: u32,
    pub state_category: Option<StateCategory>,
    pub add_extra_state_shared_building_slots: Option<i32>,
    pub history: Option<StateHistory>,
    // Date-keyed blocks inside history (e.g. "1939.1.1 = { ... }") are skipped.
}

#[derive(Debug, Default, Deserialize)]
pub struct StateHistory {
    pub owner: Option<String>,
    pub buildings: Option<StateBuildings>,
}

/// State-level buildings. Province-keyed blocks (`241 = { naval_base = 3 }`)
/// sit alongside these and are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct StateBuildings {
    pub infrastructure: Option<u32>,
    pub arms_factory: Option<u32>,
    pub industrial_complex: Option<u32>,
    pub dockyard: Option<u32>,
}

impl StateDefinition {
    /// Flattens the definition into engine-ready figures. States without an
    /// owner are unowned sea/wasteland entries and yield `None`.
    pub fn to_setup(&self) -> Option<StateSetup> {
        let history = self.history.as_ref()?;
        let owner = history.owner.clone()?;
        let buildings = history.buildings.as_ref();
        let count = |f: fn(&StateBuildings) -> Option<u32>| buildings.and_then(f).unwrap_or(0);

        let category_slots = match self.state_category {
            Some(category) => category.building_slots(),
            None => {
                log::debug!("State {} has no state_category; 0 base slots", self.id);
                0
            }
        };
        let extra = self.add_extra_state_shared_building_slots.unwrap_or(0);
        let base_building_slots = (category_slots as i64 + extra as i64).max(0) as u32;

        Some(StateSetup {
            id: self.id,
            owner,
            infrastructure: count(|b| b.infrastructure),
            base_building_slots,
            dockyards: count(|b| b.dockyard),
            civilian_factories: count(|b| b.industrial_complex),
            military_factories: count(|b| b.arms_factory),
        })
    }
}

/// Parses a single state file. `Ok(None)` for empty or ownerless files.
pub fn load_state_file(path: &Path) -> Result<Option<StateSetup>, DataError> {
    let tokens = DefaultHoi4Txt::open_txt(path)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let (ast, consumed) =
        DefaultHoi4Txt::parse_partial(&tokens).map_err(|source| DataError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if consumed < tokens.len() {
        // The game stops reading at a stray closing brace; so do we.
        let stray = ParseError::StrayClosingBrace {
            position: consumed,
            remaining: tokens.len() - consumed - 1,
        };
        log::warn!("{:?}: {}", path.file_name().unwrap_or_default(), stray);
    }

    let file: StateFile = from_node(&ast).map_err(|source| DataError::Deserialize {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.state.as_ref().and_then(StateDefinition::to_setup))
}

/// Loads all state files from `history/states`.
/// Returns the owned states and `(loaded, failed)` file counts.
pub type StateLoadResult = (Vec<StateSetup>, (usize, usize));

pub fn load_states(base_path: &Path) -> Result<StateLoadResult, DataError> {
    let states_path = base_path.join("history/states");
    if !states_path.is_dir() {
        return Err(DataError::MissingDirectory(states_path));
    }

    // Collect entries first to bridge to rayon (read_dir is not Send)
    let paths: Vec<_> = std::fs::read_dir(&states_path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();

    let results: Vec<_> = paths.par_iter().map(|p| (p, load_state_file(p))).collect();

    let mut states = Vec::new();
    let (mut loaded, mut failed) = (0, 0);
    for (path, result) in results {
        match result {
            Ok(setup) => {
                loaded += 1;
                states.extend(setup);
            }
            Err(e) => {
                log::warn!("Failed to load {:?}: {}", path.file_name().unwrap_or_default(), e);
                failed += 1;
            }
        }
    }
    states.sort_by_key(|s| s.id);

    Ok((states, (loaded, failed)))
}
