use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "teamsync.yaml";
pub const DEFAULT_DATA_DIR: &str = "_data";

pub const EDITORS_CSV: &str = "editorial_team_domains.csv";
pub const EMERITUS_CSV: &str = "emeritus_editor_domains.csv";
pub const PACKAGES_CSV: &str = "package_data.csv";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn data_dir(root: &Path, data_dir: &str) -> PathBuf {
    root.join(data_dir)
}

pub fn editors_csv(root: &Path, data_dir: &str) -> PathBuf {
    self::data_dir(root, data_dir).join(EDITORS_CSV)
}

pub fn emeritus_csv(root: &Path, data_dir: &str) -> PathBuf {
    self::data_dir(root, data_dir).join(EMERITUS_CSV)
}

pub fn packages_csv(root: &Path, data_dir: &str) -> PathBuf {
    self::data_dir(root, data_dir).join(PACKAGES_CSV)
}
