use crate::core::errors::{SDError, SDResult};
use crate::core::models::target::{StoreTarget, TargetPaths};
use crate::core::operations::generator::{DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH};
use crate::util::discovery::find_config_file;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_MYSQLADMIN: &str = "mysqladmin";

/// Contents of `sd.json`. Relative paths resolve against the file's directory.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub site: Option<String>,
    pub root: Option<PathBuf>,
    pub store: Option<StoreTarget>,
    pub auth_token: Option<String>,
    pub code_length: Option<usize>,
    pub mysqladmin: Option<PathBuf>,
}

/// Values from flags and environment; each one wins over `sd.json`.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub site: Option<String>,
    pub root: Option<PathBuf>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_host: Option<String>,
    pub sqlite_path: Option<PathBuf>,
    pub auth_token: Option<String>,
    pub code_length: Option<usize>,
    pub mysqladmin: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub site: String,
    pub targets: TargetPaths,
    pub auth_token: Option<String>,
    pub code_length: usize,
    pub mysqladmin: PathBuf,
    pub source: Option<PathBuf>,
}

impl Config {
    /// Reads `explicit` if given, otherwise the nearest `sd.json` above
    /// `cwd` (if any), then applies overrides.
    pub fn load(explicit: Option<&Path>, cwd: &Path, overrides: ConfigOverrides) -> SDResult<Self> {
        let source = match explicit {
            Some(path) => {
                let path = absolutize(path, cwd);
                if !path.is_file() {
                    return Err(SDError::Config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
                Some(path)
            }
            None => find_config_file(cwd),
        };

        let file = match &source {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                serde_json::from_str(&text).map_err(|e| {
                    SDError::Config(format!("invalid {}: {e}", path.display()))
                })?
            }
            None => ConfigFile::default(),
        };

        let base_dir = source
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(cwd)
            .to_path_buf();

        let mut config = Self::resolve(file, &base_dir, cwd, overrides)?;
        config.source = source;
        Ok(config)
    }

    fn resolve(
        file: ConfigFile,
        base_dir: &Path,
        cwd: &Path,
        overrides: ConfigOverrides,
    ) -> SDResult<Self> {
        let root = match (&overrides.root, file.root) {
            (Some(root), _) => absolutize(root, cwd),
            (None, Some(root)) => absolutize(&root, base_dir),
            (None, None) => {
                return Err(SDError::Config(
                    "no site root configured (use --root, SD_ROOT or sd.json)".to_string(),
                ));
            }
        };
        check_site_root(&root)?;

        let store = resolve_store(file.store, base_dir, cwd, &overrides)?;

        let site = overrides
            .site
            .clone()
            .or(file.site)
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| root.display().to_string());

        let code_length = overrides
            .code_length
            .or(file.code_length)
            .unwrap_or(DEFAULT_CODE_LENGTH);
        if !(1..=MAX_CODE_LENGTH).contains(&code_length) {
            return Err(SDError::Config(format!(
                "code length must be between 1 and {MAX_CODE_LENGTH}, got {code_length}"
            )));
        }

        let auth_token = overrides
            .auth_token
            .clone()
            .or(file.auth_token)
            .filter(|token| !token.is_empty());

        let mysqladmin = overrides
            .mysqladmin
            .clone()
            .or(file.mysqladmin)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MYSQLADMIN));

        Ok(Self {
            site,
            targets: TargetPaths {
                store,
                root_path: root,
            },
            auth_token,
            code_length,
            mysqladmin,
            source: None,
        })
    }
}

fn resolve_store(
    file_store: Option<StoreTarget>,
    base_dir: &Path,
    cwd: &Path,
    overrides: &ConfigOverrides,
) -> SDResult<StoreTarget> {
    if let Some(path) = &overrides.sqlite_path {
        return Ok(StoreTarget::Sqlite {
            path: absolutize(path, cwd),
        });
    }

    let mysql_overridden = overrides.db_name.is_some()
        || overrides.db_user.is_some()
        || overrides.db_password.is_some()
        || overrides.db_host.is_some();

    let file_store = file_store.map(|store| match store {
        StoreTarget::Sqlite { path } => StoreTarget::Sqlite {
            path: absolutize(&path, base_dir),
        },
        mysql => mysql,
    });

    match file_store {
        Some(store @ StoreTarget::Sqlite { .. }) if !mysql_overridden => Ok(store),
        Some(StoreTarget::Mysql {
            name,
            user,
            password,
            host,
        }) => Ok(StoreTarget::Mysql {
            name: overrides.db_name.clone().unwrap_or(name),
            user: overrides.db_user.clone().unwrap_or(user),
            password: overrides.db_password.clone().or(password),
            host: overrides.db_host.clone().or(host),
        }),
        _ => {
            let name = overrides.db_name.clone().ok_or_else(|| {
                SDError::Config(
                    "no data store configured (use --db-name, --sqlite or sd.json)".to_string(),
                )
            })?;
            let user = overrides.db_user.clone().ok_or_else(|| {
                SDError::Config("a database user is required (use --db-user)".to_string())
            })?;
            Ok(StoreTarget::Mysql {
                name,
                user,
                password: overrides.db_password.clone(),
                host: overrides.db_host.clone(),
            })
        }
    }
}

/// Refuses roots that are, or may resolve to, the filesystem root. `..` is
/// rejected outright; an existing root is also checked after resolving links.
fn check_site_root(root: &Path) -> SDResult<()> {
    if root.components().any(|c| c == Component::ParentDir) {
        return Err(SDError::Config(format!(
            "site root {} must not contain '..'",
            root.display()
        )));
    }

    let resolved = match fs::canonicalize(root) {
        Ok(resolved) => resolved,
        Err(_) => root.to_path_buf(),
    };
    if resolved.parent().is_none() {
        return Err(SDError::Config(format!(
            "refusing to use filesystem root {} as site root",
            root.display()
        )));
    }

    Ok(())
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::discovery::CONFIG_FILE_NAME;
    use tempfile::TempDir;

    fn sqlite_overrides(temp: &TempDir) -> ConfigOverrides {
        ConfigOverrides {
            root: Some(temp.path().join("site")),
            sqlite_path: Some(temp.path().join("site.db")),
            ..Default::default()
        }
    }

    #[test]
    fn test_overrides_only() {
        let temp = TempDir::new().unwrap();

        let config = Config::load(None, temp.path(), sqlite_overrides(&temp)).unwrap();

        assert_eq!(config.site, "site");
        assert_eq!(config.targets.root_path, temp.path().join("site"));
        assert_eq!(
            config.targets.store,
            StoreTarget::Sqlite {
                path: temp.path().join("site.db")
            }
        );
        assert_eq!(config.code_length, DEFAULT_CODE_LENGTH);
        assert_eq!(config.mysqladmin, PathBuf::from(DEFAULT_MYSQLADMIN));
        assert!(config.auth_token.is_none());
        assert!(config.source.is_none());
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            sqlite_path: Some(temp.path().join("site.db")),
            ..Default::default()
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[test]
    fn test_filesystem_root_refused() {
        let temp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            root: Some(PathBuf::from("/")),
            ..sqlite_overrides(&temp)
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[test]
    fn test_root_reaching_filesystem_root_through_parent_refused() {
        let temp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            root: Some(PathBuf::from("/tmp/..")),
            ..sqlite_overrides(&temp)
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[test]
    fn test_relative_parent_root_refused() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("site")).unwrap();
        let overrides = ConfigOverrides {
            root: Some(PathBuf::from("site/..")),
            ..sqlite_overrides(&temp)
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_filesystem_root_refused() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("site");
        std::os::unix::fs::symlink("/", &link).unwrap();
        let overrides = ConfigOverrides {
            root: Some(link),
            ..sqlite_overrides(&temp)
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[test]
    fn test_missing_store_is_error() {
        let temp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            root: Some(temp.path().join("site")),
            ..Default::default()
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[test]
    fn test_mysql_requires_user() {
        let temp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            root: Some(temp.path().join("site")),
            db_name: Some("wordpress".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[test]
    fn test_discovered_file_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            r#"{
                "site": "example.test",
                "root": "public",
                "store": { "kind": "sqlite", "path": "data/site.db" },
                "auth_token": "s3cret",
                "code_length": 8
            }"#,
        )
        .unwrap();
        let subdir = temp.path().join("public");
        fs::create_dir(&subdir).unwrap();

        let config = Config::load(None, &subdir, ConfigOverrides::default()).unwrap();

        assert_eq!(config.site, "example.test");
        assert_eq!(config.targets.root_path, temp.path().join("public"));
        assert_eq!(
            config.targets.store,
            StoreTarget::Sqlite {
                path: temp.path().join("data/site.db")
            }
        );
        assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.code_length, 8);
        assert_eq!(config.source, Some(temp.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            r#"{
                "root": "/srv/www",
                "store": { "kind": "mysql", "name": "wordpress", "user": "wp", "password": "old" }
            }"#,
        )
        .unwrap();
        let overrides = ConfigOverrides {
            site: Some("blog".to_string()),
            db_password: Some("new".to_string()),
            db_host: Some("db.internal".to_string()),
            ..Default::default()
        };

        let config = Config::load(None, temp.path(), overrides).unwrap();

        assert_eq!(config.site, "blog");
        assert_eq!(config.targets.root_path, PathBuf::from("/srv/www"));
        assert_eq!(
            config.targets.store,
            StoreTarget::Mysql {
                name: "wordpress".to_string(),
                user: "wp".to_string(),
                password: Some("new".to_string()),
                host: Some("db.internal".to_string()),
            }
        );
    }

    #[test]
    fn test_invalid_code_length() {
        let temp = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            code_length: Some(0),
            ..sqlite_overrides(&temp)
        };

        assert!(matches!(
            Config::load(None, temp.path(), overrides),
            Err(SDError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.json");
        fs::write(&path, r#"{ "root": "/srv/www", "bogus": true }"#).unwrap();

        let result = Config::load(Some(&path), temp.path(), sqlite_overrides(&temp));

        assert!(matches!(result, Err(SDError::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file() {
        let temp = TempDir::new().unwrap();

        let result = Config::load(
            Some(Path::new("nope.json")),
            temp.path(),
            sqlite_overrides(&temp),
        );

        assert!(matches!(result, Err(SDError::Config(_))));
    }
}
