pub mod commands;
pub mod output;

use crate::core::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sd")]
#[command(about = "Self destruct - irreversibly delete a site and its data store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: nearest sd.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Site root to delete
    #[arg(long, global = true, env = "SD_ROOT")]
    pub root: Option<PathBuf>,

    /// Site name shown in prompts and messages
    #[arg(long, global = true, env = "SD_SITE")]
    pub site: Option<String>,

    /// MySQL database to drop
    #[arg(long, global = true, env = "SD_DB_NAME")]
    pub db_name: Option<String>,

    /// MySQL user
    #[arg(long, global = true, env = "SD_DB_USER")]
    pub db_user: Option<String>,

    /// MySQL password
    #[arg(long, global = true, env = "SD_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// MySQL host
    #[arg(long, global = true, env = "SD_DB_HOST")]
    pub db_host: Option<String>,

    /// SQLite database to drop instead of MySQL
    #[arg(long = "sqlite", global = true, env = "SD_SQLITE_PATH")]
    pub sqlite_path: Option<PathBuf>,

    /// mysqladmin binary
    #[arg(long, global = true, env = "SD_MYSQLADMIN")]
    pub mysqladmin: Option<PathBuf>,

    /// Confirmation code length
    #[arg(long, global = true, env = "SD_CODE_LENGTH")]
    pub code_length: Option<usize>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log errors
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Delete the data store and the site root (irreversible)
    Destroy {
        /// Proceed without prompting
        #[arg(long, short)]
        yes: bool,
    },

    /// Show what destroy would do, without doing it
    Plan,

    /// Serve confirmation prompts and submissions as JSON-RPC over stdio
    Serve {
        /// Token every submission must carry
        #[arg(long, env = "SD_AUTH_TOKEN", hide_env_values = true)]
        auth_token: Option<String>,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let auth_token = match &self.command {
            Commands::Serve { auth_token } => auth_token.clone(),
            _ => None,
        };

        ConfigOverrides {
            site: self.site.clone(),
            root: self.root.clone(),
            db_name: self.db_name.clone(),
            db_user: self.db_user.clone(),
            db_password: self.db_password.clone(),
            db_host: self.db_host.clone(),
            sqlite_path: self.sqlite_path.clone(),
            auth_token,
            code_length: self.code_length,
            mysqladmin: self.mysqladmin.clone(),
        }
    }
}
