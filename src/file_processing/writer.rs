use crate::errors::AppError;
use crate::models::CodeProjectDirectives;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const ROLLBACK_DIR: &str = ".rollback";
const ROLLBACK_JOURNAL: &str = "rollback.toml";
const PENDING_EDITS: &str = "pending_edits.md";

/// Destination for the directives of a parsed response.
#[allow(async_fn_in_trait)]
pub trait ProjectStore {
    /// Replaces the file at `path`, creating parent folders as needed.
    async fn write_file(&mut self, path: &str, content: &str) -> Result<(), AppError>;

    /// Hands free-text edit instructions for an existing file to whoever applies them.
    async fn apply_edit(&mut self, path: &str, instructions: &str) -> Result<(), AppError>;

    async fn delete_file(&mut self, path: &str) -> Result<(), AppError>;

    async fn move_file(&mut self, from: &str, to: &str) -> Result<(), AppError>;
}

/// Counts of what [`apply_directives`] did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ApplyReport {
    pub written: usize,
    pub edited: usize,
    pub deleted: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failures: Vec<String>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.written + self.edited + self.deleted + self.moved
    }
}

/// Applies writes, then edits, then deletes, then moves, each in list order.
///
/// A failing directive is logged and recorded; the rest still run. A write
/// that duplicates a quick edit (same path and body) is skipped, since the
/// same fenced block matches both passes.
pub async fn apply_directives<S: ProjectStore>(
    store: &mut S,
    directives: &CodeProjectDirectives,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    for file in &directives.files {
        let duplicates_edit = directives
            .edits
            .iter()
            .any(|edit| edit.path == file.path && edit.instructions == file.content);
        if duplicates_edit {
            log::debug!("Skipping write of {} already requested as a quick edit", file.path);
            report.skipped += 1;
            continue;
        }
        match store.write_file(&file.path, &file.content).await {
            Ok(()) => report.written += 1,
            Err(e) => record_failure(&mut report, format!("write {}: {}", file.path, e)),
        }
    }

    for edit in &directives.edits {
        match store.apply_edit(&edit.path, &edit.instructions).await {
            Ok(()) => report.edited += 1,
            Err(e) => record_failure(&mut report, format!("edit {}: {}", edit.path, e)),
        }
    }

    for path in &directives.delete_files {
        match store.delete_file(path).await {
            Ok(()) => report.deleted += 1,
            Err(e) => record_failure(&mut report, format!("delete {}: {}", path, e)),
        }
    }

    for file_move in &directives.move_files {
        match store.move_file(&file_move.from, &file_move.to).await {
            Ok(()) => report.moved += 1,
            Err(e) => record_failure(
                &mut report,
                format!("move {} -> {}: {}", file_move.from, file_move.to, e),
            ),
        }
    }

    report
}

fn record_failure(report: &mut ApplyReport, message: String) {
    log::warn!("Directive failed: {}", message);
    report.failures.push(message);
}

/// Project store backed by a directory on disk.
///
/// Originals are backed up before their first change so that
/// [`rollback_last_run`] can undo the run.
pub struct LocalProjectStore {
    root: PathBuf,
    output_directory: PathBuf,
    rollback_dir: PathBuf,
    journal: RollbackConfig,
    touched: HashSet<PathBuf>,
}

impl LocalProjectStore {
    /// Opens a store rooted at `root`, replacing any previous rollback journal
    /// kept in `output_directory`.
    ///
    /// Both directories are canonicalized so the journal holds absolute paths
    /// and a later rollback works from any working directory.
    pub async fn open(root: &Path, output_directory: &Path) -> Result<Self, AppError> {
        let root = fs::canonicalize(root).await?;
        fs::create_dir_all(output_directory).await?;
        let output_directory = fs::canonicalize(output_directory).await?;

        let rollback_dir = output_directory.join(ROLLBACK_DIR);
        if rollback_dir.exists() {
            fs::remove_dir_all(&rollback_dir).await?;
        }
        fs::create_dir_all(&rollback_dir).await?;

        Ok(Self {
            root,
            output_directory,
            rollback_dir,
            journal: RollbackConfig::default(),
            touched: HashSet::new(),
        })
    }

    /// Writes the rollback journal and returns its path.
    pub async fn finish(self) -> Result<PathBuf, AppError> {
        let journal_path = self.rollback_dir.join(ROLLBACK_JOURNAL);
        let journal = toml::to_string(&self.journal)?;
        fs::write(&journal_path, journal).await?;
        Ok(journal_path)
    }

    pub fn pending_edits_path(&self) -> PathBuf {
        self.output_directory.join(PENDING_EDITS)
    }

    /// Maps a project-relative path onto the store root.
    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        if path.trim().is_empty() {
            return Err(AppError::StoreError("empty path".to_string()));
        }
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(AppError::StoreError(format!(
                "path must stay inside the project: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Backs up `target` before its first change, or notes it as new.
    async fn record_original(&mut self, target: &Path) -> Result<(), AppError> {
        if !self.touched.insert(target.to_path_buf()) {
            return Ok(());
        }
        if target.is_file() {
            let backup_path = self
                .rollback_dir
                .join(format!("{}.bak", self.journal.rollback_files.len()));
            fs::copy(target, &backup_path).await?;
            self.journal.rollback_files.push((
                target.display().to_string(),
                backup_path.display().to_string(),
            ));
        } else {
            self.journal.new_files.push(target.display().to_string());
        }
        Ok(())
    }
}

impl ProjectStore for LocalProjectStore {
    async fn write_file(&mut self, path: &str, content: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        self.record_original(&target).await?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, content.as_bytes()).await?;
        log::info!("Wrote {}", target.display());
        Ok(())
    }

    async fn apply_edit(&mut self, path: &str, instructions: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        if !target.is_file() {
            return Err(AppError::StoreError(format!("no such file to edit: {}", path)));
        }
        // Journalled like a project file; rollback restores the previous queue.
        let pending_path = self.pending_edits_path();
        self.record_original(&pending_path).await?;
        let mut pending = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&pending_path)
            .await?;
        pending
            .write_all(format!("## {}\n\n{}\n\n", path, instructions).as_bytes())
            .await?;
        log::info!("Queued edit for {}", target.display());
        Ok(())
    }

    async fn delete_file(&mut self, path: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        if !target.is_file() {
            return Err(AppError::StoreError(format!("no such file to delete: {}", path)));
        }
        self.record_original(&target).await?;
        fs::remove_file(&target).await?;
        log::info!("Deleted {}", target.display());
        Ok(())
    }

    async fn move_file(&mut self, from: &str, to: &str) -> Result<(), AppError> {
        let source = self.resolve(from)?;
        let destination = self.resolve(to)?;
        if !source.is_file() {
            return Err(AppError::StoreError(format!("no such file to move: {}", from)));
        }
        self.record_original(&source).await?;
        self.record_original(&destination).await?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&source, &destination).await?;
        log::info!("Moved {} to {}", source.display(), destination.display());
        Ok(())
    }
}

/// Rolls back changes made by the last run.
pub async fn rollback_last_run(output_directory: &Path) -> Result<(), AppError> {
    let rollback_dir = output_directory.join(ROLLBACK_DIR);
    let rollback_config_path = rollback_dir.join(ROLLBACK_JOURNAL);
    if !rollback_config_path.exists() {
        return Err(AppError::RollbackError(
            "No changes to rollback".to_string(),
        ));
    }

    let rollback_config_str = fs::read_to_string(&rollback_config_path).await?;
    let rollback_config: RollbackConfig = toml::from_str(&rollback_config_str)?;

    // Delete new files created during the run
    for new_file in rollback_config.new_files {
        let path = Path::new(&new_file);
        if path.exists() {
            fs::remove_file(path).await?;
            log::info!("Deleted new file: {}", path.display());
        }
    }

    // Restore original files from the .rollback directory
    for (original_path, backup_path) in rollback_config.rollback_files {
        let original_path = Path::new(&original_path);
        let backup_path = Path::new(&backup_path);
        if backup_path.exists() {
            if let Some(parent) = original_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::copy(backup_path, original_path).await?;
            log::info!("Restored: {}", original_path.display());
        }
    }

    fs::remove_dir_all(rollback_dir).await?;

    Ok(())
}

/// Journal of one run, stored as `rollback.toml`.
#[derive(Serialize, Deserialize, Debug, Default)]
struct RollbackConfig {
    new_files: Vec<String>,
    rollback_files: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileEdit, FileMove, FileWrite};
    use pretty_assertions::assert_eq;
    use std::fs as std_fs;

    struct Workspace {
        _dir: tempfile::TempDir,
        root: PathBuf,
        output: PathBuf,
    }

    fn workspace() -> Workspace {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        let output = dir.path().join("z9.output");
        std_fs::create_dir_all(root.join("src")).unwrap();
        std_fs::create_dir_all(&output).unwrap();
        std_fs::write(root.join("src/App.jsx"), "old app").unwrap();
        std_fs::write(root.join("src/legacy.js"), "legacy").unwrap();
        Workspace {
            _dir: dir,
            root,
            output,
        }
    }

    fn write(path: &str, content: &str) -> FileWrite {
        FileWrite {
            path: path.to_string(),
            content: content.to_string(),
            file_type: None,
        }
    }

    #[tokio::test]
    async fn applies_every_directive_kind() {
        let ws = workspace();
        let mut store = LocalProjectStore::open(&ws.root, &ws.output).await.unwrap();
        let directives = CodeProjectDirectives {
            id: "p1".to_string(),
            files: vec![
                write("src/App.jsx", "new app"),
                write("src/components/Button.jsx", "button"),
            ],
            edits: vec![FileEdit {
                path: "src/App.jsx".to_string(),
                instructions: "Use the new button".to_string(),
            }],
            delete_files: vec!["src/legacy.js".to_string()],
            move_files: vec![FileMove {
                from: "src/components/Button.jsx".to_string(),
                to: "src/ui/Button.jsx".to_string(),
            }],
        };

        let report = apply_directives(&mut store, &directives).await;

        assert_eq!(report.failures, Vec::<String>::new());
        assert_eq!(report.applied(), 5);
        assert_eq!(std_fs::read_to_string(ws.root.join("src/App.jsx")).unwrap(), "new app");
        assert!(!ws.root.join("src/legacy.js").exists());
        assert!(!ws.root.join("src/components/Button.jsx").exists());
        assert_eq!(
            std_fs::read_to_string(ws.root.join("src/ui/Button.jsx")).unwrap(),
            "button"
        );
        let pending = std_fs::read_to_string(store.pending_edits_path()).unwrap();
        assert_eq!(pending, "## src/App.jsx\n\nUse the new button\n\n");
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_batch() {
        let ws = workspace();
        let mut store = LocalProjectStore::open(&ws.root, &ws.output).await.unwrap();
        let directives = CodeProjectDirectives {
            id: "p".to_string(),
            files: vec![write("../escape.js", "x"), write("", "x"), write("ok.js", "ok")],
            edits: vec![],
            delete_files: vec!["missing.js".to_string()],
            move_files: vec![FileMove {
                from: "nope.js".to_string(),
                to: "still-nope.js".to_string(),
            }],
        };

        let report = apply_directives(&mut store, &directives).await;

        assert_eq!(report.written, 1);
        assert_eq!(report.failures.len(), 4);
        assert!(ws.root.join("ok.js").exists());
        assert!(!ws.root.parent().unwrap().join("escape.js").exists());
    }

    #[tokio::test]
    async fn write_duplicating_quick_edit_is_skipped() {
        let ws = workspace();
        let mut store = LocalProjectStore::open(&ws.root, &ws.output).await.unwrap();
        let directives = CodeProjectDirectives {
            id: "p".to_string(),
            files: vec![write("src/App.jsx", "make the title bold")],
            edits: vec![FileEdit {
                path: "src/App.jsx".to_string(),
                instructions: "make the title bold".to_string(),
            }],
            delete_files: vec![],
            move_files: vec![],
        };

        let report = apply_directives(&mut store, &directives).await;

        assert_eq!(report.skipped, 1);
        assert_eq!(report.edited, 1);
        assert_eq!(std_fs::read_to_string(ws.root.join("src/App.jsx")).unwrap(), "old app");
    }

    #[tokio::test]
    async fn rollback_restores_previous_state() {
        let ws = workspace();
        let mut store = LocalProjectStore::open(&ws.root, &ws.output).await.unwrap();
        store.write_file("src/App.jsx", "first").await.unwrap();
        store.write_file("src/App.jsx", "second").await.unwrap();
        store.write_file("src/new.js", "new").await.unwrap();
        store.delete_file("src/legacy.js").await.unwrap();
        store.finish().await.unwrap();

        rollback_last_run(&ws.output).await.unwrap();

        assert_eq!(std_fs::read_to_string(ws.root.join("src/App.jsx")).unwrap(), "old app");
        assert_eq!(std_fs::read_to_string(ws.root.join("src/legacy.js")).unwrap(), "legacy");
        assert!(!ws.root.join("src/new.js").exists());
        assert!(!ws.output.join(ROLLBACK_DIR).exists());
    }

    #[tokio::test]
    async fn rollback_drops_queued_edits_of_the_last_run() {
        let ws = workspace();
        for run in 0..2 {
            let mut store = LocalProjectStore::open(&ws.root, &ws.output).await.unwrap();
            store
                .apply_edit("src/App.jsx", &format!("edit run {}", run))
                .await
                .unwrap();
            store.finish().await.unwrap();
        }

        let queued = std_fs::read_to_string(ws.output.join(PENDING_EDITS)).unwrap();
        assert!(queued.contains("edit run 0") && queued.contains("edit run 1"));

        rollback_last_run(&ws.output).await.unwrap();

        let queued = std_fs::read_to_string(ws.output.join(PENDING_EDITS)).unwrap();
        assert_eq!(queued, "## src/App.jsx\n\nedit run 0\n\n");
    }

    #[tokio::test]
    async fn rollback_removes_a_queue_created_by_the_run() {
        let ws = workspace();
        let mut store = LocalProjectStore::open(&ws.root, &ws.output).await.unwrap();
        store.apply_edit("src/App.jsx", "only edit").await.unwrap();
        store.finish().await.unwrap();

        rollback_last_run(&ws.output).await.unwrap();

        assert!(!ws.output.join(PENDING_EDITS).exists());
    }

    #[tokio::test]
    async fn journal_holds_absolute_paths_for_relative_roots() {
        let dir = tempfile::tempdir_in(".").unwrap();
        let base = Path::new(".").join(dir.path().file_name().unwrap());
        let root = base.join("project");
        let output = base.join("z9.output");
        std_fs::create_dir_all(root.join("src")).unwrap();
        std_fs::write(root.join("src/App.jsx"), "old app").unwrap();

        let mut store = LocalProjectStore::open(&root, &output).await.unwrap();
        store.write_file("src/App.jsx", "new app").await.unwrap();
        store.write_file("src/new.js", "new").await.unwrap();
        let journal_path = store.finish().await.unwrap();

        let journal: RollbackConfig =
            toml::from_str(&std_fs::read_to_string(journal_path).unwrap()).unwrap();
        assert_eq!(journal.new_files.len(), 1);
        assert_eq!(journal.rollback_files.len(), 1);
        assert!(journal.new_files.iter().all(|path| Path::new(path).is_absolute()));
        assert!(journal
            .rollback_files
            .iter()
            .all(|(original, backup)| Path::new(original).is_absolute()
                && Path::new(backup).is_absolute()));

        rollback_last_run(&output).await.unwrap();
        assert_eq!(std_fs::read_to_string(root.join("src/App.jsx")).unwrap(), "old app");
        assert!(!root.join("src/new.js").exists());
    }

    #[tokio::test]
    async fn rollback_without_journal_fails() {
        let ws = workspace();
        let err = rollback_last_run(&ws.output).await.unwrap_err();
        assert!(matches!(err, AppError::RollbackError(_)));
    }
}
