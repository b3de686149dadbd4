//! Application discovery under the main directory.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::manifest::MANIFEST_FILE;

/// List the applications under `main_dir`.
///
/// An application is an immediate, non-hidden subdirectory that contains a
/// `dotconf` manifest. Names are returned in lexical order so that the
/// materialization order does not depend on filesystem enumeration order.
///
/// # Errors
///
/// Returns an error if `main_dir` cannot be listed.
pub fn discover_apps(main_dir: &Path) -> Result<Vec<String>> {
    let mut apps = Vec::new();
    for entry in std::fs::read_dir(main_dir)
        .with_context(|| format!("reading directory {}", main_dir.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", main_dir.display()))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if entry.path().join(MANIFEST_FILE).is_file() {
            apps.push(name);
        }
    }
    apps.sort();
    Ok(apps)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn app(root: &Path, name: &str) {
        fs::create_dir_all(root.join(name)).unwrap();
        fs::write(root.join(name).join(MANIFEST_FILE), "").unwrap();
    }

    #[test]
    fn finds_directories_with_manifest_sorted() {
        let dir = tempfile::tempdir().unwrap();
        app(dir.path(), "zsh");
        app(dir.path(), "alacritty");
        app(dir.path(), "vim");
        assert_eq!(
            discover_apps(dir.path()).unwrap(),
            vec!["alacritty", "vim", "zsh"]
        );
    }

    #[test]
    fn ignores_directories_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        app(dir.path(), "vim");
        fs::create_dir(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("README"), "x").unwrap();
        assert_eq!(discover_apps(dir.path()).unwrap(), vec!["vim"]);
    }

    #[test]
    fn ignores_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        app(dir.path(), ".repo");
        app(dir.path(), "git");
        assert_eq!(discover_apps(dir.path()).unwrap(), vec!["git"]);
    }

    #[test]
    fn manifest_must_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("odd").join(MANIFEST_FILE)).unwrap();
        assert!(discover_apps(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_main_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_apps(&dir.path().join("absent")).is_err());
    }
}
