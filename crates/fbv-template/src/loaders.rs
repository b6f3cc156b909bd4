//! Template loaders.
//!
//! A loader returns every template it knows as `(name, source)` pairs. The
//! engine compiles them all up front so that template inheritance and
//! includes resolve across directories.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use fbv_core::FbvResult;

/// Supplies template sources.
pub trait TemplateLoader: Send + Sync {
    /// Returns every template this loader can find, keyed by template name.
    fn load_all(&self) -> FbvResult<BTreeMap<String, String>>;
}

/// Loads every file under one or more directories.
///
/// Template names are paths relative to the directory, with `/` separators.
/// When two directories hold the same name, the earlier directory wins.
/// Missing directories are skipped, as are hidden files.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    dirs: Vec<PathBuf>,
}

impl FileSystemLoader {
    /// Creates a loader searching `dirs` in order.
    pub const fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// The directories searched.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl TemplateLoader for FileSystemLoader {
    fn load_all(&self) -> FbvResult<BTreeMap<String, String>> {
        let mut templates = BTreeMap::new();
        for dir in &self.dirs {
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "template directory not found, skipping");
                continue;
            }
            let mut found = Vec::new();
            walk(dir, "", &mut found)?;
            for (name, path) in found {
                if templates.contains_key(&name) {
                    continue;
                }
                let source = fs::read_to_string(&path)?;
                templates.insert(name, source);
            }
        }
        tracing::debug!(count = templates.len(), "loaded templates");
        Ok(templates)
    }
}

fn walk(dir: &Path, prefix: &str, found: &mut Vec<(String, PathBuf)>) -> FbvResult<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);
    for entry in entries {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }
        let name = if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{prefix}/{file_name}")
        };
        let path = entry.path();
        if path.is_dir() {
            walk(&path, &name, found)?;
        } else {
            found.push((name, path));
        }
    }
    Ok(())
}

/// Holds templates in memory. Useful in tests.
#[derive(Debug, Clone, Default)]
pub struct StringLoader {
    templates: BTreeMap<String, String>,
}

impl StringLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(name.into(), source.into());
        self
    }
}

impl TemplateLoader for StringLoader {
    fn load_all(&self) -> FbvResult<BTreeMap<String, String>> {
        Ok(self.templates.clone())
    }
}
