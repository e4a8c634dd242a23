use crate::core::errors::{SDError, SDResult};
use crate::core::models::target::StoreTarget;
use std::path::PathBuf;
use std::process::Command;

/// Drops a MySQL database through the `mysqladmin` client.
#[derive(Debug, Clone)]
pub struct MysqlAdmin {
    program: PathBuf,
}

impl MysqlAdmin {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn args(&self, store: &StoreTarget) -> Vec<String> {
        let StoreTarget::Mysql { name, user, host, .. } = store else {
            return Vec::new();
        };

        let mut args = vec![format!("--user={user}")];
        if let Some(host) = host {
            args.push(format!("--host={host}"));
        }
        args.extend(["--force".to_string(), "drop".to_string(), name.clone()]);
        args
    }

    pub fn command_line(&self, store: &StoreTarget) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args(store));
        parts.join(" ")
    }

    pub fn drop_database(&self, store: &StoreTarget) -> SDResult<()> {
        let StoreTarget::Mysql { password, .. } = store else {
            return Err(SDError::InvalidInput(format!(
                "mysqladmin cannot drop a {} store",
                store.kind()
            )));
        };

        let mut command = Command::new(&self.program);
        command.args(self.args(store));
        // MYSQL_PWD keeps the password out of the process list.
        if let Some(password) = password {
            command.env("MYSQL_PWD", password);
        }

        tracing::debug!("Running {}", self.command_line(store));
        let output = command.output().map_err(|e| {
            SDError::StoreCommandFailure(format!(
                "failed to run {}: {e}",
                self.program.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SDError::StoreCommandFailure(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
