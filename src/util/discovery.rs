use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "sd.json";

/// Walks up from `start` looking for `sd.json`.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        current = dir.parent();
    }

    None
}
