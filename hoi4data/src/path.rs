use std::path::{Path, PathBuf};

/// Overrides install detection when set.
pub const GAME_PATH_ENV: &str = "HOI4_GAME_PATH";

const STEAM_APP_DIR: &str = "steamapps/common/Hearts of Iron IV";

/// A directory counts as an install when it has the state history files.
pub fn is_game_dir(path: &Path) -> bool {
    path.join("history/states").is_dir()
}

/// Steam library roots on Windows, Linux (native and Flatpak) and macOS.
fn steam_roots() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from(r"C:\Program Files (x86)\Steam")];
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".local/share/Steam"));
        roots.push(home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"));
        roots.push(home.join("Library/Application Support/Steam"));
    }
    roots
}

/// Finds the Hearts of Iron IV install: `HOI4_GAME_PATH` first, then the
/// usual Steam locations.
pub fn detect_game_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(GAME_PATH_ENV).map(PathBuf::from) {
        if is_game_dir(&path) {
            return Some(path);
        }
        log::warn!("{} is set to {:?}, which is not a game install", GAME_PATH_ENV, path);
    }

    steam_roots()
        .into_iter()
        .map(|root| root.join(STEAM_APP_DIR))
        .find(|path| is_game_dir(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_game_dir() {
        let dir = tempdir().unwrap();
        assert!(!is_game_dir(dir.path()));
        std::fs::create_dir_all(dir.path().join("history/states")).unwrap();
        assert!(is_game_dir(dir.path()));
    }

    #[test]
    fn test_detected_path_looks_like_an_install() {
        // Usually nothing is installed where tests run.
        if let Some(path) = detect_game_path() {
            assert!(is_game_dir(&path));
        }
    }
}
