use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The data store that gets dropped before the file tree.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreTarget {
    Mysql {
        name: String,
        user: String,
        #[serde(default, skip_serializing)]
        password: Option<String>,
        #[serde(default)]
        host: Option<String>,
    },
    Sqlite {
        path: PathBuf,
    },
}

impl StoreTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mysql { .. } => "mysql",
            Self::Sqlite { .. } => "sqlite",
        }
    }

    /// Human-facing name of the store, e.g. the database name.
    pub fn identifier(&self) -> String {
        match self {
            Self::Mysql { name, .. } => name.clone(),
            Self::Sqlite { path } => path.display().to_string(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mysql {
                name,
                user,
                password,
                host,
            } => f
                .debug_struct("Mysql")
                .field("name", name)
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .field("host", host)
                .finish(),
            Self::Sqlite { path } => f.debug_struct("Sqlite").field("path", path).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    pub store: StoreTarget,
    pub root_path: PathBuf,
}
