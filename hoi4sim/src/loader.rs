use anyhow::{Context, Result};
use hoi4data::{CountrySetup, StateSetup};
use hoi4sim_core::{Country, RegionSetup, RuleSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where starting data comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A game install with a `history/` directory.
    Game(PathBuf),
    /// The flat per-state CSV export.
    Csv(PathBuf),
}

pub fn load_country_setup(source: &Source, country: &str) -> Result<CountrySetup> {
    match source {
        Source::Game(game_path) => {
            log::info!("Loading history from {:?}", game_path);
            let data = hoi4data::load_game_data(game_path)
                .with_context(|| format!("failed to load game data from {}", game_path.display()))?;
            data.country(country).cloned().with_context(|| {
                format!("country '{}' not found in {}", country, game_path.display())
            })
        }
        Source::Csv(path) => {
            log::info!("Loading states from {:?}", path);
            let rows = hoi4data::flat::load_csv(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            hoi4data::flat::country_from_rows(&rows, country)
                .with_context(|| format!("country '{}' not found in {}", country, path.display()))
        }
    }
}

fn region_setup(state: &StateSetup) -> RegionSetup {
    RegionSetup {
        id: state.id,
        infrastructure: state.infrastructure,
        base_building_slots: state.base_building_slots,
        dockyards: state.dockyards,
        civilian_factories: state.civilian_factories,
        military_factories: state.military_factories,
    }
}

/// Builds the canonical country. States keep the order the loader gave them.
pub fn build_country(setup: &CountrySetup, rules: Arc<RuleSet>) -> Result<Country> {
    let regions: Vec<RegionSetup> = setup.states.iter().map(region_setup).collect();
    Country::new(
        &regions,
        setup.stability,
        setup.war_support,
        setup.tag.clone(),
        rules,
    )
    .with_context(|| format!("invalid rules for {}", setup.tag))
}

/// Default rules, or a JSON override on top of them.
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    let Some(path) = path else {
        return Ok(RuleSet::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules from {}", path.display()))?;
    let rules = RuleSet::from_json(&json)
        .with_context(|| format!("invalid rules in {}", path.display()))?;
    log::info!("Using rules from {:?}", path);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_csv_source_builds_country() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("states.csv");
        fs::write(
            &path,
            "country,infrastructure,building_slots,military_factories,dockyards,civilian_factories\n\
             Germany,5,10,3,1,4\n\
             Germany,7,12,2,0,6\n\
             Italy,3,8,1,0,2\n\
             0\n",
        )
        .unwrap();

        let setup = load_country_setup(&Source::Csv(path.clone()), "Germany").unwrap();
        let country = build_country(&setup, Arc::new(RuleSet::default())).unwrap();
        assert_eq!(country.name(), "Germany");
        assert_eq!(country.regions().len(), 2);
        assert_eq!(country.regions()[0].infrastructure(), 7);
        assert_eq!(country.civilian_factories(), 10);
        assert_eq!(country.military_factories(), 5);
        assert_eq!(country.stability(), hoi4data::DEFAULT_STABILITY);

        let err = load_country_setup(&Source::Csv(path), "France").unwrap_err();
        assert!(err.to_string().contains("France"));

        let mut rules = RuleSet::default();
        rules.factory.minimum_efficiency = 0.0;
        let err = build_country(&setup, Arc::new(rules)).unwrap_err();
        assert!(format!("{:#}", err).contains("minimum efficiency"));
    }

    #[test]
    fn test_rules_override() {
        assert_eq!(load_rules(None).unwrap(), RuleSet::default());

        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{ "country": { "political_power_per_day": 2.0 } }"#).unwrap();
        let rules = load_rules(Some(&path)).unwrap();
        assert_eq!(rules.country.political_power_per_day, 2.0);

        fs::write(&path, r#"{ "economy_laws": [] }"#).unwrap();
        assert!(load_rules(Some(&path)).is_err());
        assert!(load_rules(Some(&dir.path().join("missing.json"))).is_err());
    }
}
