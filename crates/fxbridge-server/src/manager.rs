//! Server manager: RCON operations, log retrieval, operation history
//!
//! One manager owns one RCON client, one log store, and the bounded
//! operation log. Command operations never return `Err`: transport
//! failures are folded into `success:false` envelopes so tool callers can
//! inspect and report them without unwinding.

use crate::logs::LogStore;
use crate::oplog::{Operation, OperationLog};
use fxbridge_core::{BridgeError, Result, ToolResponse};
use fxbridge_rcon::{RconClient, RconConfig, classify, validate};
use std::path::Path;
use tracing::{info, warn};

/// Entries retained in the operation ring buffer
const OPLOG_CAPACITY: usize = 256;

/// Manager for one FXServer connection
#[derive(Debug)]
pub struct ServerManager<L: LogStore> {
    rcon: RconClient,
    logs: L,
    oplog: OperationLog,
}

impl<L: LogStore> ServerManager<L> {
    /// Create a manager. The password is the one non-optional piece of
    /// configuration; everything else has defaults.
    pub fn new(config: RconConfig, logs: L) -> Result<Self> {
        if config.password.is_empty() {
            return Err(BridgeError::Config("RCON password is required".to_string()));
        }
        Ok(Self {
            rcon: RconClient::new(config),
            logs,
            oplog: OperationLog::new(OPLOG_CAPACITY),
        })
    }

    /// Probe the server and verify the password
    pub async fn connect(&self) -> Result<()> {
        self.rcon.connect().await
    }

    /// Release the RCON socket
    pub async fn close(&self) {
        self.rcon.close().await;
    }

    /// Start (or confirm) a plugin
    pub async fn ensure_plugin(&mut self, name: &str) -> ToolResponse {
        self.run_command("ENSURE", &format!("ensure {}", name)).await
    }

    /// Stop a plugin
    pub async fn stop_plugin(&mut self, name: &str) -> ToolResponse {
        self.run_command("STOP", &format!("stop {}", name)).await
    }

    /// Restart a plugin
    pub async fn restart_plugin(&mut self, name: &str) -> ToolResponse {
        self.run_command("RESTART", &format!("restart {}", name)).await
    }

    /// Rescan the server's resource list
    pub async fn refresh_resources(&mut self) -> ToolResponse {
        self.run_command("REFRESH", "refresh").await
    }

    /// Execute a raw console command
    pub async fn execute(&mut self, command: &str) -> ToolResponse {
        self.run_command("COMMAND", command).await
    }

    /// Validate, transmit, classify, and record one command
    async fn run_command(&mut self, kind: &str, command: &str) -> ToolResponse {
        if let Some(rejected) = validate(command) {
            self.oplog
                .record(kind, format!("{} - rejected: {}", command, rejected.message));
            return rejected;
        }

        match self.rcon.send(command).await {
            Ok(raw) => {
                let outcome = classify(&raw, command);
                self.oplog
                    .record(kind, format!("{} - {}", command, outcome.message));
                outcome
            }
            Err(err) => {
                warn!("RCON command failed: {}", err);
                self.oplog.record("ERROR", format!("{} - {}", command, err));
                ToolResponse::from_error(&err, command)
            }
        }
    }

    /// Console log report read from the server's log files
    pub async fn console_logs(&mut self, lines: usize) -> String {
        let files = self.logs.find_files(None).await;
        if files.is_empty() {
            let message = "Log files not accessible. Please ensure the logs directory path is configured correctly.";
            self.oplog.record("LOG_ACCESS", message);
            return message.to_string();
        }

        let mut report = vec!["=== FXSERVER CONSOLE LOGS ===".to_string()];
        for path in &files {
            match self.logs.read_last_lines(path, lines, None).await {
                Ok(content) if !content.is_empty() => {
                    report.push(format!("--- {} ---\n{}", file_name(path), content));
                }
                Ok(_) => {}
                Err(err) => {
                    report.push(format!(
                        "--- {} ---\nError reading file: {}",
                        file_name(path),
                        err
                    ));
                }
            }
        }

        self.oplog.record(
            "LOG_ACCESS",
            format!("read up to {} lines from {} file(s)", lines, files.len()),
        );
        report.join("\n\n")
    }

    /// Plugin log report: lines tagged `script:` (or `script:<plugin>`)
    pub async fn plugin_logs(&mut self, lines: usize, plugin: Option<&str>) -> String {
        let files = self.logs.find_files(None).await;
        let filter = match plugin {
            Some(name) => format!("script:{}", name),
            None => "script:".to_string(),
        };

        let mut report = vec!["=== FXSERVER PLUGIN LOGS ===".to_string()];
        let mut found = false;
        for path in &files {
            if let Ok(content) = self.logs.read_last_lines(path, lines, Some(&filter)).await {
                if !content.is_empty() {
                    found = true;
                    report.push(format!("--- {} ---\n{}", file_name(path), content));
                }
            }
        }

        if !found {
            let message = match plugin {
                Some(name) => format!(
                    "No logs found for plugin '{}'. Plugin may not be running or generating logs.",
                    name
                ),
                None => "No plugin logs found. Plugins may not be running or generating logs."
                    .to_string(),
            };
            self.oplog.record("PLUGIN_LOG_ACCESS", &message);
            return message;
        }

        self.oplog.record(
            "PLUGIN_LOG_ACCESS",
            format!("read plugin logs ({} line cap)", lines),
        );
        report.join("\n\n")
    }

    /// The last `limit` recorded operations, oldest first
    pub fn recent_operations(&self, limit: usize) -> Vec<Operation> {
        self.oplog.recent(limit)
    }

    /// Drop all recorded operations
    pub fn clear_operations(&mut self) {
        info!("Operation log cleared");
        self.oplog.clear();
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;

    /// In-memory store: one fake file with fixed content
    #[derive(Debug)]
    struct FakeStore {
        files: Vec<PathBuf>,
        content: String,
    }

    #[async_trait]
    impl LogStore for FakeStore {
        async fn find_files(&self, _dir: Option<&Path>) -> Vec<PathBuf> {
            self.files.clone()
        }

        async fn read_last_lines(
            &self,
            _path: &Path,
            lines: usize,
            filter: Option<&str>,
        ) -> fxbridge_core::Result<String> {
            let kept: Vec<&str> = self
                .content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .filter(|l| filter.is_none_or(|f| l.to_lowercase().contains(&f.to_lowercase())))
                .collect();
            let start = kept.len().saturating_sub(lines);
            Ok(kept[start..].join("\n"))
        }
    }

    fn manager_with(content: &str) -> ServerManager<FakeStore> {
        let store = FakeStore {
            files: vec![PathBuf::from("fxserver.log")],
            content: content.to_string(),
        };
        ServerManager::new(
            RconConfig::new("127.0.0.1", 30120, "hunter2"),
            store,
        )
        .unwrap()
    }

    #[test]
    fn missing_password_is_a_config_error() {
        let store = FakeStore {
            files: vec![],
            content: String::new(),
        };
        let err = ServerManager::new(RconConfig::default(), store).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[tokio::test]
    async fn denied_command_never_touches_the_socket() {
        // The RCON client was never opened, so any transmit attempt would
        // surface as a socket error rather than a permission rejection.
        let mut manager = manager_with("");
        let resp = manager.execute("rm -rf /").await;
        assert!(!resp.success);
        assert_eq!(
            resp.error.unwrap().code,
            fxbridge_core::ErrorCode::PermissionDenied
        );
        assert_eq!(manager.recent_operations(10).len(), 1);
    }

    #[tokio::test]
    async fn transport_failures_become_envelopes() {
        // Socket never opened: send fails, and the failure is reported as
        // data instead of unwinding.
        let mut manager = manager_with("");
        let resp = manager.execute("status").await;
        assert!(!resp.success);
        assert_eq!(
            resp.error.unwrap().code,
            fxbridge_core::ErrorCode::ConnectionFailed
        );
    }

    #[tokio::test]
    async fn console_report_carries_file_sections() {
        let mut manager = manager_with("line one\nline two\n");
        let report = manager.console_logs(10).await;
        assert!(report.starts_with("=== FXSERVER CONSOLE LOGS ==="));
        assert!(report.contains("--- fxserver.log ---"));
        assert!(report.contains("line two"));
    }

    #[tokio::test]
    async fn plugin_report_filters_script_lines() {
        let mut manager =
            manager_with("script:chat joined\nplain console noise\nscript:economy tick\n");

        let report = manager.plugin_logs(10, None).await;
        assert!(report.contains("script:chat joined"));
        assert!(!report.contains("plain console noise"));

        let report = manager.plugin_logs(10, Some("economy")).await;
        assert!(report.contains("script:economy tick"));
        assert!(!report.contains("script:chat joined"));
    }

    #[tokio::test]
    async fn plugin_report_explains_when_nothing_matches() {
        let mut manager = manager_with("plain console noise\n");
        let report = manager.plugin_logs(10, Some("ghost")).await;
        assert!(report.contains("No logs found for plugin 'ghost'"));
    }

    #[tokio::test]
    async fn operations_accumulate_and_clear() {
        let mut manager = manager_with("");
        manager.execute("rm -rf /").await;
        manager.execute("").await;
        assert_eq!(manager.recent_operations(10).len(), 2);

        manager.clear_operations();
        assert!(manager.recent_operations(10).is_empty());
    }
}
