//! Log store collaborator: enumerating and tailing server log files
//!
//! The manager only needs two things from log storage: enumerate candidate
//! files and tail one of them. The trait keeps that seam narrow so tests
//! can substitute an in-memory store; `FileLogStore` is the real thing,
//! reading the txData log layout.

use async_trait::async_trait;
use fxbridge_core::{BridgeError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

/// Directories probed for log files when none is configured
const DEFAULT_LOG_DIRS: &[&str] = &["local/txData/default/logs", "txData/default/logs"];

/// Known log file names, most current first
const KNOWN_LOG_FILES: &[&str] = &["fxserver.log", "server.log"];

/// Narrow interface the manager requires from log storage
#[async_trait]
pub trait LogStore: Send + Sync + 'static {
    /// Enumerate candidate log files, preferred first. An explicit `dir`
    /// takes precedence over configured and default locations.
    async fn find_files(&self, dir: Option<&Path>) -> Vec<PathBuf>;

    /// Tail-like read of the last `lines` non-blank lines of `path`,
    /// optionally keeping only lines containing `filter`
    /// (case-insensitive).
    async fn read_last_lines(
        &self,
        path: &Path,
        lines: usize,
        filter: Option<&str>,
    ) -> Result<String>;
}

/// Log store reading the server's txData log directories
pub struct FileLogStore {
    logs_dir: Option<PathBuf>,
}

impl FileLogStore {
    pub fn new(logs_dir: Option<PathBuf>) -> Self {
        Self { logs_dir }
    }

    /// Existing directories to search, explicit first, duplicates dropped
    async fn candidate_dirs(&self, dir: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = dir {
            candidates.push(dir.to_path_buf());
        }
        if let Some(dir) = &self.logs_dir {
            candidates.push(dir.clone());
        }
        for dir in DEFAULT_LOG_DIRS {
            candidates.push(PathBuf::from(dir));
        }
        if let Ok(cwd) = std::env::current_dir() {
            for dir in DEFAULT_LOG_DIRS {
                candidates.push(cwd.join(dir));
            }
        }

        let mut dirs = Vec::new();
        for candidate in candidates {
            if dirs.contains(&candidate) {
                continue;
            }
            match fs::metadata(&candidate).await {
                Ok(meta) if meta.is_dir() => dirs.push(candidate),
                _ => {}
            }
        }
        dirs
    }

    /// Newest `fxserver_*.log` in `dir` by modification time, if any
    async fn newest_dated_log(dir: &Path) -> Option<PathBuf> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        let mut entries = fs::read_dir(dir).await.ok()?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with("fxserver_") || !name.ends_with(".log") {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let Ok(modified) = meta.modified() else {
                continue;
            };
            if newest.as_ref().is_none_or(|(at, _)| modified > *at) {
                newest = Some((modified, entry.path()));
            }
        }
        newest.map(|(_, path)| path)
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn find_files(&self, dir: Option<&Path>) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for dir in self.candidate_dirs(dir).await {
            for name in KNOWN_LOG_FILES {
                let path = dir.join(name);
                if fs::metadata(&path).await.is_ok() {
                    files.push(path);
                }
            }
            // Dated rotation files stand in when the live log is absent
            if fs::metadata(dir.join("fxserver.log")).await.is_err() {
                if let Some(dated) = Self::newest_dated_log(&dir).await {
                    files.push(dated);
                }
            }
        }
        files.dedup();
        debug!("Found {} log file(s)", files.len());
        files
    }

    async fn read_last_lines(
        &self,
        path: &Path,
        lines: usize,
        filter: Option<&str>,
    ) -> Result<String> {
        let data = fs::read_to_string(path)
            .await
            .map_err(|e| BridgeError::Io(format!("{}: {}", path.display(), e)))?;

        let needle = filter.map(str::to_lowercase);
        let kept: Vec<&str> = data
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| {
                needle
                    .as_ref()
                    .is_none_or(|n| line.to_lowercase().contains(n))
            })
            .collect();

        let start = kept.len().saturating_sub(lines);
        Ok(kept[start..].join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn tail_keeps_the_last_n_non_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(dir.path(), "fxserver.log", "one\n\ntwo\nthree\n\nfour\n");
        let store = FileLogStore::new(None);

        let tail = store.read_last_lines(&path, 2, None).await.unwrap();
        assert_eq!(tail, "three\nfour");
    }

    #[tokio::test]
    async fn tail_filter_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(
            dir.path(),
            "fxserver.log",
            "script:chat hello\nother line\nSCRIPT:chat goodbye\n",
        );
        let store = FileLogStore::new(None);

        let tail = store
            .read_last_lines(&path, 10, Some("script:chat"))
            .await
            .unwrap();
        assert_eq!(tail, "script:chat hello\nSCRIPT:chat goodbye");
    }

    #[tokio::test]
    async fn find_files_prefers_known_names_in_an_explicit_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "fxserver.log", "a\n");
        write_log(dir.path(), "server.log", "b\n");
        write_log(dir.path(), "unrelated.txt", "c\n");
        let store = FileLogStore::new(None);

        let files = store.find_files(Some(dir.path())).await;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["fxserver.log", "server.log"]);
    }

    #[tokio::test]
    async fn dated_rotation_files_back_up_a_missing_live_log() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "fxserver_2026_01_01.log", "old\n");
        write_log(dir.path(), "fxserver_2026_02_01.log", "new\n");
        let store = FileLogStore::new(Some(dir.path().to_path_buf()));

        let files = store.find_files(None).await;
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("fxserver_2026_"));
    }

    #[tokio::test]
    async fn missing_file_reads_as_an_io_error() {
        let store = FileLogStore::new(None);
        let err = store
            .read_last_lines(Path::new("/nonexistent/fxserver.log"), 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
