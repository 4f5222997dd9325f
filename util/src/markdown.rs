//! Markdown browsing helpers: recursive discovery of markdown files under a
//! content root, and rendering a single file to sanitized HTML.

use pulldown_cmark::{Options, Parser, html};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Directories that are never descended into while listing.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".cache",
    ".config",
    ".npm",
    ".next",
    "target",
];

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("Access denied: path outside content root")]
    OutsideRoot,
    #[error("Only markdown files are allowed")]
    NotMarkdown,
    #[error("File not found")]
    NotFound,
    #[error("Failed to read file: {0}")]
    Io(String),
}

/// A rendered markdown file: the raw source, the sanitized HTML, and the
/// normalized relative path it was read from.
#[derive(Debug, Serialize)]
pub struct RenderedMarkdown {
    pub content: String,
    pub html: String,
    pub file: String,
}

/// Recursively lists `.md` files under `root`, as relative paths.
///
/// Dependency and VCS directories are skipped, and unreadable subdirectories
/// are ignored rather than failing the whole listing.
pub fn list_markdown_files(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "md")
                    .unwrap_or(false)
        })
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(|rel| rel.to_string_lossy().into_owned())
        })
        .collect()
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| EXCLUDED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Reads and renders one markdown file relative to `root`.
///
/// The requested path is normalized lexically before touching the
/// filesystem; anything that escapes the root (absolute paths, `..`
/// components) is rejected, as are non-markdown extensions.
pub fn read_rendered(root: &Path, file: &str) -> Result<RenderedMarkdown, MarkdownError> {
    let relative = normalize_within_root(Path::new(file)).ok_or(MarkdownError::OutsideRoot)?;

    if relative.extension().map(|ext| ext != "md").unwrap_or(true) {
        return Err(MarkdownError::NotMarkdown);
    }

    let content = std::fs::read_to_string(root.join(&relative)).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MarkdownError::NotFound
        } else {
            MarkdownError::Io(e.to_string())
        }
    })?;

    Ok(RenderedMarkdown {
        html: render(&content),
        file: relative.to_string_lossy().into_owned(),
        content,
    })
}

/// Converts markdown to HTML and sanitizes the result.
pub fn render(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut raw = String::new();
    html::push_html(&mut raw, parser);

    ammonia::clean(&raw)
}

/// Lexically resolves `path`, returning `None` if it is absolute or climbs
/// above its starting point.
fn normalize_within_root(path: &Path) -> Option<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                if !resolved.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_markdown_recursively_and_skips_excluded_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs/guides")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();
        fs::write(dir.path().join("docs/guides/setup.md"), "# setup").unwrap();
        fs::write(dir.path().join("docs/notes.txt"), "not markdown").unwrap();
        fs::write(dir.path().join("node_modules/pkg/README.md"), "# dep").unwrap();

        let mut files = list_markdown_files(dir.path());
        files.sort();

        assert_eq!(files, vec!["README.md", "docs/guides/setup.md"]);
    }

    #[test]
    fn renders_and_sanitizes() {
        let html = render("# Title\n\n<script>alert('x')</script>\n\n*em*");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>em</em>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn rejects_paths_escaping_the_root() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_rendered(dir.path(), "../outside.md"),
            Err(MarkdownError::OutsideRoot)
        ));
        assert!(matches!(
            read_rendered(dir.path(), "/etc/passwd.md"),
            Err(MarkdownError::OutsideRoot)
        ));
    }

    #[test]
    fn rejects_non_markdown_extensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.ts"), "let x = 1;").unwrap();
        assert!(matches!(
            read_rendered(dir.path(), "app.ts"),
            Err(MarkdownError::NotMarkdown)
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_rendered(dir.path(), "missing.md"),
            Err(MarkdownError::NotFound)
        ));
    }

    #[test]
    fn reads_and_renders_a_file() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/setup.md"), "## Install").unwrap();

        let rendered = read_rendered(dir.path(), "docs/./setup.md").unwrap();
        assert_eq!(rendered.file, "docs/setup.md");
        assert_eq!(rendered.content, "## Install");
        assert!(rendered.html.contains("<h2>Install</h2>"));
    }
}
