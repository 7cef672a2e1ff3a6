use crate::errors::AppError;
use crate::models::{NodeType, TreeNode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names never included in a scanned project tree.
const SKIPPED_DIRECTORIES: [&str; 3] = ["node_modules", "target", "dist"];

/// Loads a project tree exported by the web client as a JSON array of nodes.
pub async fn load_tree(path: &Path) -> Result<Vec<TreeNode>, AppError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let nodes = serde_json::from_str(&contents)?;
    Ok(nodes)
}

/// Reads an image for the user turn: data URIs pass through, files are base64-encoded.
pub async fn load_image(image: &str) -> Result<String, AppError> {
    if image.starts_with("data:") {
        return Ok(image.to_string());
    }
    let bytes = tokio::fs::read(image).await?;
    log::debug!("Encoding {} byte image from {}", bytes.len(), image);
    Ok(STANDARD.encode(bytes))
}

/// Builds the project tree of `root`, depth-first with entries sorted by name.
///
/// Hidden entries, dependency/build folders and anything under an ignored path
/// are left out. Ignore paths may be given relative to the project, relative to
/// the working directory (prefixed with `root`) or absolute. `parent_id` holds
/// the parent's path relative to `root`.
pub fn scan_directory(root: &Path, ignore_paths: &[String]) -> Result<Vec<TreeNode>, AppError> {
    let ignored = ignored_relative_paths(root, ignore_paths);
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !is_skipped(entry) && !is_ignored(&project_relative(root, entry.path()), &ignored)
        });

    let mut roots = Vec::new();
    // Open folders, innermost last, paired with their depth.
    let mut stack: Vec<(usize, TreeNode)> = Vec::new();

    for entry in walker {
        let entry = entry.map_err(|e| {
            AppError::InvalidInput(format!("Failed to scan {}: {}", root.display(), e))
        })?;
        let depth = entry.depth();

        while stack.last().is_some_and(|(open_depth, _)| *open_depth >= depth) {
            close_node(&mut stack, &mut roots);
        }

        let node = TreeNode {
            name: entry.file_name().to_string_lossy().into_owned(),
            node_type: if entry.file_type().is_dir() {
                NodeType::Folder
            } else {
                NodeType::File
            },
            parent_id: parent_id(root, entry.path()),
            children: entry.file_type().is_dir().then(Vec::new),
        };
        stack.push((depth, node));
    }

    while !stack.is_empty() {
        close_node(&mut stack, &mut roots);
    }

    log::debug!("Scanned {} top-level entries in {}", roots.len(), root.display());
    Ok(roots)
}

/// Pops the innermost open node and attaches it to its parent.
fn close_node(stack: &mut Vec<(usize, TreeNode)>, roots: &mut Vec<TreeNode>) {
    let Some((_, node)) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some((_, parent)) => parent.children.get_or_insert_with(Vec::new).push(node),
        None => roots.push(node),
    }
}

fn parent_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.parent()?.strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_string_lossy().replace('\\', "/"))
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || (entry.file_type().is_dir() && SKIPPED_DIRECTORIES.contains(&&*name))
}

/// `path` relative to `root`, without `.` components.
fn project_relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

fn ignored_relative_paths(root: &Path, ignore_paths: &[String]) -> Vec<PathBuf> {
    let canonical_root = root.canonicalize().ok();
    ignore_paths
        .iter()
        .map(|ignore_path| {
            let path = Path::new(ignore_path);
            match &canonical_root {
                Some(canonical) if path.is_absolute() && !path.starts_with(root) => {
                    let canonical_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
                    project_relative(canonical, &canonical_path)
                }
                _ => project_relative(root, path),
            }
        })
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}

/// Checks if a project-relative path should be ignored.
fn is_ignored(path: &Path, ignored: &[PathBuf]) -> bool {
    ignored
        .iter()
        .any(|ignored_path| path.starts_with(ignored_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::prompt::render_tree;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn sample_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("src/main.jsx"), "").unwrap();
        fs::write(root.join("src/components/Header.jsx"), "").unwrap();
        fs::write(root.join("src/.env"), "SECRET=1").unwrap();
        fs::write(root.join("node_modules/react/index.js"), "").unwrap();
        dir
    }

    #[test]
    fn scans_nested_folders_in_name_order() {
        let dir = sample_project();
        let tree = scan_directory(dir.path(), &[]).unwrap();

        let names: Vec<&str> = tree.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["package.json", "src"]);
        assert_eq!(
            render_tree(&tree).unwrap(),
            "src (folder)\n  components (folder)\n    Header.jsx (file)\n  main.jsx (file)"
        );
    }

    #[test]
    fn records_relative_parent_ids() {
        let dir = sample_project();
        let tree = scan_directory(dir.path(), &[]).unwrap();

        let src = tree.iter().find(|node| node.name == "src").unwrap();
        assert_eq!(src.parent_id, None);
        let children = src.children.as_ref().unwrap();
        assert_eq!(children[0].parent_id.as_deref(), Some("src"));
        let header = &children[0].children.as_ref().unwrap()[0];
        assert_eq!(header.parent_id.as_deref(), Some("src/components"));
        assert!(header.children.is_none());
    }

    #[test]
    fn empty_folders_keep_an_empty_child_list() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        let tree = scan_directory(dir.path(), &[]).unwrap();
        assert_eq!(tree, vec![TreeNode::folder("src", vec![])]);
    }

    #[test]
    fn ignored_paths_are_skipped() {
        let dir = sample_project();
        let ignored = dir.path().join("src/components").display().to_string();

        let tree = scan_directory(dir.path(), &[ignored]).unwrap();
        assert_eq!(render_tree(&tree).unwrap(), "src (folder)\n  main.jsx (file)");
    }

    #[test]
    fn relative_ignores_apply_to_a_relative_project_root() {
        let dir = tempfile::tempdir_in(".").unwrap();
        let relative_root = Path::new(".").join(dir.path().file_name().unwrap());
        let root = relative_root.as_path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(root.join("src/main.jsx"), "").unwrap();
        fs::write(root.join("src/components/Header.jsx"), "").unwrap();

        let from_project = scan_directory(root, &["src/components".to_string()]).unwrap();
        assert_eq!(
            render_tree(&from_project).unwrap(),
            "src (folder)\n  main.jsx (file)"
        );

        let dotted = scan_directory(root, &["./src/components/".to_string()]).unwrap();
        assert_eq!(render_tree(&dotted).unwrap(), "src (folder)\n  main.jsx (file)");

        let cwd_relative = root.join("src/components").display().to_string();
        let from_cwd = scan_directory(root, &[cwd_relative]).unwrap();
        assert_eq!(render_tree(&from_cwd).unwrap(), "src (folder)\n  main.jsx (file)");
    }

    #[test]
    fn paths_are_made_project_relative() {
        assert_eq!(
            project_relative(Path::new("."), Path::new("./src/components")),
            PathBuf::from("src/components")
        );
        assert_eq!(
            ignored_relative_paths(Path::new("."), &["./src/components".to_string()]),
            vec![PathBuf::from("src/components")]
        );
        assert!(is_ignored(
            &project_relative(Path::new("."), Path::new("./src/components/Header.jsx")),
            &[PathBuf::from("src/components")]
        ));
    }

    #[tokio::test]
    async fn data_uri_images_pass_through() {
        let image = load_image("data:image/png;base64,AAAA").await.unwrap();
        assert_eq!(image, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn image_files_are_base64_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvas.png");
        fs::write(&path, b"png").unwrap();

        let image = load_image(path.to_str().unwrap()).await.unwrap();
        assert_eq!(image, "cG5n");
    }

    #[tokio::test]
    async fn loads_exported_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        fs::write(
            &path,
            r#"[{"name":"src","type":"folder","children":[{"name":"App.jsx","type":"file"}]}]"#,
        )
        .unwrap();

        let tree = load_tree(&path).await.unwrap();
        assert_eq!(
            tree,
            vec![TreeNode::folder("src", vec![TreeNode::file("App.jsx")])]
        );
    }
}
