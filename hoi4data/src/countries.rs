use crate::DataError;
use hoi4txt::{DefaultHoi4Txt, Hoi4Txt, from_node};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The parts of `history/countries/TAG - Name.txt` the simulation reads.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CountryHistory {
    pub capital: Option<u32>,
    pub set_stability: Option<f64>,
    pub set_war_support: Option<f64>,
}

/// The tag is the first three characters of the file name.
pub fn tag_from_file_name(name: &str) -> Option<String> {
    let tag: String = name.chars().take(3).collect();
    if tag.len() == 3 && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(tag.to_uppercase())
    } else {
        None
    }
}

pub fn load_country_history(path: &Path) -> Result<CountryHistory, DataError> {
    let tokens = DefaultHoi4Txt::open_txt(path)?;
    if tokens.is_empty() {
        return Ok(CountryHistory::default());
    }
    let (ast, _) = DefaultHoi4Txt::parse_partial(&tokens).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    from_node(&ast).map_err(|source| DataError::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}

pub type CountryLoadResult = (BTreeMap<String, CountryHistory>, (usize, usize));

/// Loads every country history file, keyed by tag.
pub fn load_country_histories(base_path: &Path) -> Result<CountryLoadResult, DataError> {
    let countries_path = base_path.join("history/countries");
    if !countries_path.is_dir() {
        return Err(DataError::MissingDirectory(countries_path));
    }

    let paths: Vec<_> = std::fs::read_dir(&countries_path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();

    let results: Vec<_> = paths
        .par_iter()
        .map(|path| -> Result<(String, CountryHistory), DataError> {
            let tag = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(tag_from_file_name)
                .ok_or_else(|| DataError::Invalid(format!("no tag in {:?}", path)))?;
            Ok((tag, load_country_history(path)?))
        })
        .collect();

    let mut histories = BTreeMap::new();
    let (mut loaded, mut failed) = (0, 0);
    for result in results {
        match result {
            Ok((tag, history)) => {
                loaded += 1;
                histories.insert(tag, history);
            }
            Err(e) => {
                log::warn!("Failed to load country history: {}", e);
                failed += 1;
            }
        }
    }
    Ok((histories, (loaded, failed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_tag_from_file_name() {
        assert_eq!(tag_from_file_name("GER - Germany.txt"), Some("GER".into()));
        assert_eq!(tag_from_file_name("sov.txt"), Some("SOV".into()));
        assert_eq!(tag_from_file_name("D0 - x.txt"), None);
        assert_eq!(tag_from_file_name("ab"), None);
    }

    #[test]
    fn test_load_country_histories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history/countries");
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join("SOV - Soviet Union.txt"),
            r#"
            capital = 219
            oob = "SOV_1936"
            set_research_slots = 4
            set_stability = 0.8
            set_war_support = 0.2
            set_politics = { ruling_party = communism last_election = "1933.3.5" }
            add_ideas = { limited_exports }
            1939.1.1 = { set_war_support = 0.9 }
            "#,
        )
        .unwrap();
        fs::write(path.join("ENG - Britain.txt"), "set_stability = 0.7").unwrap();
        fs::write(path.join("ITA - Italy.txt"), "capital = { broken").unwrap();

        let (map, (loaded, failed)) = load_country_histories(dir.path()).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(failed, 1);

        let sov = &map["SOV"];
        assert_eq!(sov.capital, Some(219));
        assert_eq!(sov.set_stability, Some(0.8));
        assert_eq!(sov.set_war_support, Some(0.2));
        assert_eq!(map["ENG"].set_war_support, None);
    }
}
