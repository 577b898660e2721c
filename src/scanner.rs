// SPDX-License-Identifier: MIT OR Apache-2.0

//! File collector using the ignore crate (same as ripgrep)

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, warn};

/// Build output, VCS metadata and lockfiles. Matched as substrings of the
/// root-relative path.
pub const IGNORED_PATH_FRAGMENTS: &[&str] = &[
    "node_modules",
    ".git/",
    ".hg/",
    ".svn/",
    "dist/",
    "build/",
    "target/",
    "coverage/",
    ".next/",
    "__pycache__",
    ".venv/",
    "vendor/",
    ".min.js",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "poetry.lock",
    "composer.lock",
    "Gemfile.lock",
];

/// Extensions searched when the caller does not supply an allowlist
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "mts", "cts", "tsx", "py", "pyi", "rs", "go", "java", "c", "cpp",
    "h", "hpp", "cs", "rb", "php", "swift", "kt", "scala", "lua", "sh", "html", "css", "vue", "svelte",
    "md", "txt", "json", "yaml", "yml", "toml",
];

/// Walks a directory and returns the files worth searching
pub struct FileCollector {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_patterns: Vec<String>,
    respect_git_ignore: bool,
}

impl FileCollector {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: Vec::new(),
            exclude_patterns: Vec::new(),
            respect_git_ignore: true,
        }
    }

    /// Restrict to these extensions. An empty list keeps the default set.
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Extra path substrings to skip, on top of [`IGNORED_PATH_FRAGMENTS`]
    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.exclude_patterns = excludes;
        self
    }

    /// Enable or disable respect for git ignore rules
    pub fn with_gitignore(mut self, enabled: bool) -> Self {
        self.respect_git_ignore = enabled;
        self
    }

    fn make_builder(&self, root: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(root);
        builder.hidden(false);

        if self.respect_git_ignore {
            builder.git_ignore(true).git_exclude(true).git_global(true);
        } else {
            builder
                .git_ignore(false)
                .git_exclude(false)
                .git_global(false)
                .ignore(false);
        }

        builder
    }

    /// Collect absolute paths of searchable files, sorted.
    ///
    /// A missing root yields an empty list. Unreadable directories are
    /// logged and skipped.
    pub fn collect(&self) -> Vec<PathBuf> {
        let root = match std::fs::canonicalize(&self.root) {
            Ok(root) if root.is_dir() => root,
            Ok(root) => {
                debug!("{} is not a directory", root.display());
                return Vec::new();
            }
            Err(e) => {
                debug!("cannot open {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let (tx, rx) = mpsc::channel();
        let walker = self
            .make_builder(&root)
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| name != ".git" && name != ".hg" && name != ".svn")
                    .unwrap_or(true)
            })
            .build_parallel();

        walker.run(|| {
            let tx = tx.clone();
            let root = root.clone();

            Box::new(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("skipping unreadable entry: {}", e);
                        return ignore::WalkState::Continue;
                    }
                };
                let path = entry.path();
                if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    return ignore::WalkState::Continue;
                }
                let rel = relative_display_path(path, &root);
                if self.is_excluded(&rel) {
                    return ignore::WalkState::Continue;
                }
                if self.accepts_extension(path) {
                    let _ = tx.send(path.to_path_buf());
                }
                ignore::WalkState::Continue
            })
        });

        drop(tx);
        let mut files: Vec<PathBuf> = rx.into_iter().collect();
        files.sort();
        debug!("collected {} files under {}", files.len(), root.display());
        files
    }

    fn is_excluded(&self, rel_path: &str) -> bool {
        IGNORED_PATH_FRAGMENTS
            .iter()
            .any(|fragment| rel_path.contains(fragment))
            || self
                .exclude_patterns
                .iter()
                .any(|pattern| !pattern.is_empty() && rel_path.contains(pattern.as_str()))
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let lower = ext.to_ascii_lowercase();
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().any(|candidate| *candidate == lower)
        } else {
            self.extensions.iter().any(|candidate| *candidate == lower)
        }
    }
}

/// Root-relative path with forward slashes, used for display and ignores.
pub fn relative_display_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rendered = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if rendered.is_empty() {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x\n").unwrap();
    }

    #[test]
    fn missing_root_is_empty_not_error() {
        let files = FileCollector::new("/definitely/not/here/reposcope").collect();
        assert!(files.is_empty());
    }

    #[test]
    fn skips_ignored_fragments_and_unknown_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/app.js");
        touch(dir.path(), "src/util.py");
        touch(dir.path(), "node_modules/lib/index.js");
        touch(dir.path(), "dist/bundle.js");
        touch(dir.path(), "package-lock.json");
        touch(dir.path(), "image.png");

        let files = FileCollector::new(dir.path()).collect();
        let root = fs::canonicalize(dir.path()).unwrap();
        let rels: Vec<String> = files
            .iter()
            .map(|p| relative_display_path(p, &root))
            .collect();
        assert_eq!(rels, vec!["src/app.js", "src/util.py"]);
        assert!(files.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn extension_allowlist_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.js");
        touch(dir.path(), "b.py");
        touch(dir.path(), "c.ts");

        let files = FileCollector::new(dir.path())
            .with_extensions(&[".py".to_string(), "TS".to_string()])
            .collect();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.py", "c.ts"]);
    }

    #[test]
    fn custom_excludes_are_substring_matched() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/keep.js");
        touch(dir.path(), "src/generated/skip.js");

        let files = FileCollector::new(dir.path())
            .with_excludes(vec!["generated".to_string()])
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/keep.js"));
    }

    #[test]
    fn module_typescript_extensions_are_collected_by_default() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/util.mts");
        touch(dir.path(), "src/legacy.cts");

        let files = FileCollector::new(dir.path()).collect();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["legacy.cts", "util.mts"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_does_not_stop_the_walk() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a_open/app.js");
        touch(dir.path(), "b_locked/hidden.js");
        touch(dir.path(), "c_open/util.py");
        let locked = dir.path().join("b_locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let files = FileCollector::new(dir.path()).collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Root can still read the locked directory, so only the open ones are asserted
        assert!(files.iter().any(|p| p.ends_with("a_open/app.js")));
        assert!(files.iter().any(|p| p.ends_with("c_open/util.py")));
    }
}
