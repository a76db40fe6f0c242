use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ai::{QTable, QTableSnapshot};
use crate::checkpoint::metadata::CheckpointMetadata;
use crate::error::CheckpointError;
use crate::game::Mark;

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
    pub keep_last_n: usize,
    pub keep_best_n: usize,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_last_n: 5,
            keep_best_n: 3,
        }
    }
}

/// A loaded checkpoint: its metadata and one Q-table per stored mark.
#[derive(Debug)]
pub struct CheckpointData {
    pub path: PathBuf,
    pub metadata: CheckpointMetadata,
    pub tables: Vec<(Mark, QTable)>,
}

impl CheckpointData {
    pub fn table(&self, mark: Mark) -> Option<&QTable> {
        self.tables
            .iter()
            .find(|(m, _)| *m == mark)
            .map(|(_, table)| table)
    }

    /// Move the table for `mark` out of the checkpoint.
    pub fn take_table(&mut self, mark: Mark) -> Option<QTable> {
        let index = self.tables.iter().position(|(m, _)| *m == mark)?;
        Some(self.tables.swap_remove(index).1)
    }
}

fn table_file_name(mark: Mark) -> String {
    format!("q_table_{}.json", mark.name().to_ascii_lowercase())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CheckpointError> {
    let json = fs::read_to_string(path).map_err(|e| CheckpointError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&json).map_err(|e| CheckpointError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Manages saving, loading, listing, and pruning checkpoints.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Self {
        if let Err(e) = fs::create_dir_all(&config.checkpoint_dir) {
            log::warn!(
                "could not create checkpoint directory {}: {e}",
                config.checkpoint_dir.display()
            );
        }
        CheckpointManager { config }
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.config.checkpoint_dir
    }

    /// Write `tables` and `metadata` as `checkpoint_<episode>/`.
    ///
    /// Files are written to a `.tmp` sibling which is then renamed into
    /// place; the `latest` link is updated and old checkpoints pruned.
    pub fn save_checkpoint(
        &self,
        tables: &[(Mark, &QTable)],
        mut metadata: CheckpointMetadata,
    ) -> Result<PathBuf, CheckpointError> {
        let dir_name = format!("checkpoint_{:07}", metadata.episode);
        let tmp_dir = self.config.checkpoint_dir.join(format!("{}.tmp", dir_name));
        let final_dir = self.config.checkpoint_dir.join(&dir_name);

        if tmp_dir.exists() {
            fs::remove_dir_all(&tmp_dir)?;
        }
        fs::create_dir_all(&tmp_dir)?;

        for (mark, table) in tables {
            let json = serde_json::to_string(&table.snapshot())?;
            fs::write(tmp_dir.join(table_file_name(*mark)), json)?;
        }

        metadata.timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        metadata.marks = tables.iter().map(|(mark, _)| *mark).collect();
        let meta_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(tmp_dir.join("metadata.json"), meta_json)?;

        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;

        self.update_latest_link(&dir_name)?;
        self.prune_old_checkpoints()?;

        log::info!(
            "saved checkpoint {} ({} table(s))",
            final_dir.display(),
            tables.len()
        );
        Ok(final_dir)
    }

    /// Load metadata and every Q-table listed in it from `dir`.
    pub fn load_checkpoint(&self, dir: &Path) -> Result<CheckpointData, CheckpointError> {
        let metadata: CheckpointMetadata = read_json(&dir.join("metadata.json"))?;

        let mut tables = Vec::with_capacity(metadata.marks.len());
        for &mark in &metadata.marks {
            let path = dir.join(table_file_name(mark));
            let snapshot: QTableSnapshot = read_json(&path)?;
            let table = QTable::try_from(snapshot)
                .map_err(|source| CheckpointError::Table { path, source })?;
            tables.push((mark, table));
        }

        Ok(CheckpointData {
            path: dir.to_path_buf(),
            metadata,
            tables,
        })
    }

    /// Load the checkpoint the `latest` link points to.
    pub fn load_latest(&self) -> Result<CheckpointData, CheckpointError> {
        let target = self.resolve_latest()?;
        self.load_checkpoint(&target)
    }

    /// List all checkpoints sorted by episode (ascending).
    pub fn list_checkpoints(&self) -> Result<Vec<(PathBuf, CheckpointMetadata)>, CheckpointError> {
        let mut results = Vec::new();
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() || path.is_symlink() {
                continue;
            }
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if !name_str.starts_with("checkpoint_") || name_str.ends_with(".tmp") {
                continue;
            }
            let meta_path = path.join("metadata.json");
            if meta_path.exists() {
                let metadata: CheckpointMetadata = read_json(&meta_path)?;
                results.push((path, metadata));
            }
        }
        results.sort_by_key(|(_, m)| m.episode);
        Ok(results)
    }

    /// Prune old checkpoints, keeping the union of the last N and best N by
    /// win rate. The newest checkpoint is always kept.
    fn prune_old_checkpoints(&self) -> Result<(), CheckpointError> {
        let checkpoints = self.list_checkpoints()?;
        let keep_last = self.config.keep_last_n.max(1);
        if checkpoints.len() <= keep_last {
            return Ok(());
        }

        let total = checkpoints.len();
        let mut keep: HashSet<usize> = (total - keep_last..total).collect();

        let mut by_win_rate: Vec<(usize, f64)> = checkpoints
            .iter()
            .enumerate()
            .map(|(i, (_, m))| (i, m.metrics.win_rate))
            .collect();
        by_win_rate.sort_by(|a, b| b.1.total_cmp(&a.1));
        let best = by_win_rate.iter().take(self.config.keep_best_n);
        keep.extend(best.map(|&(i, _)| i));

        for (i, (path, _)) in checkpoints.iter().enumerate() {
            if !keep.contains(&i) {
                log::debug!("pruning checkpoint {}", path.display());
                fs::remove_dir_all(path)?;
            }
        }

        Ok(())
    }

    fn resolve_latest(&self) -> Result<PathBuf, CheckpointError> {
        let link_path = self.config.checkpoint_dir.join("latest");
        if link_path.symlink_metadata().is_err() {
            return Err(CheckpointError::NoLatestSymlink(
                self.config.checkpoint_dir.clone(),
            ));
        }
        let resolved = match fs::read_link(&link_path) {
            Ok(target) => target,
            // Platforms without symlinks get a plain file holding the name.
            Err(_) => PathBuf::from(fs::read_to_string(&link_path)?.trim()),
        };
        Ok(if resolved.is_relative() {
            self.config.checkpoint_dir.join(resolved)
        } else {
            resolved
        })
    }

    /// Point `latest` at the given checkpoint directory name.
    fn update_latest_link(&self, dir_name: &str) -> Result<(), CheckpointError> {
        let link_path = self.config.checkpoint_dir.join("latest");
        if link_path.symlink_metadata().is_ok() {
            fs::remove_file(&link_path)?;
        }
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir_name, &link_path)?;
        #[cfg(not(unix))]
        fs::write(&link_path, dir_name)?;
        Ok(())
    }
}
