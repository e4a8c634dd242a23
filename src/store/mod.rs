pub mod mysql;
pub mod sqlite;

use crate::core::errors::SDResult;
use crate::core::models::target::StoreTarget;
use std::path::PathBuf;

pub trait StoreDestroyer: Send + Sync {
    /// Irrecoverably drops the store. The outcome of the underlying command
    /// or driver call is always reported.
    fn destroy_store(&self, store: &StoreTarget) -> SDResult<()>;

    /// One-line rendering of what `destroy_store` will do, without secrets.
    fn describe(&self, store: &StoreTarget) -> String;
}

/// Routes each store kind to its destroyer.
#[derive(Debug, Clone)]
pub struct DefaultStoreDestroyer {
    mysql: mysql::MysqlAdmin,
}

impl DefaultStoreDestroyer {
    pub fn new(mysqladmin: impl Into<PathBuf>) -> Self {
        Self {
            mysql: mysql::MysqlAdmin::new(mysqladmin),
        }
    }
}

impl StoreDestroyer for DefaultStoreDestroyer {
    fn destroy_store(&self, store: &StoreTarget) -> SDResult<()> {
        tracing::info!(kind = store.kind(), "Dropping store {}", store.identifier());
        match store {
            StoreTarget::Mysql { .. } => self.mysql.drop_database(store),
            StoreTarget::Sqlite { path } => sqlite::drop_database(path),
        }
    }

    fn describe(&self, store: &StoreTarget) -> String {
        match store {
            StoreTarget::Mysql { .. } => self.mysql.command_line(store),
            StoreTarget::Sqlite { path } => format!("drop sqlite database {}", path.display()),
        }
    }
}
