use anyhow::{Context, Result};
use log::{debug, trace, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::util::has_suffix;

/// A directory directly under the modules directory, bundled as a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub files: Vec<PathBuf>,
}

/// A matching file outside the modules subtree, bundled on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiscFile {
    pub path: PathBuf,
    /// Path relative to the target root
    pub relative: PathBuf,
}

/// Everything found under the target root
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    pub root: PathBuf,
    pub modules: Vec<Module>,
    pub misc_files: Vec<MiscFile>,
}

impl SourceTree {
    /// Total number of source files across modules and misc files
    pub fn file_count(&self) -> usize {
        self.modules.iter().map(|m| m.files.len()).sum::<usize>() + self.misc_files.len()
    }
}

/// Walks the target root and sorts files into modules and misc files
#[derive(Debug)]
pub struct Discovery<'a> {
    config: &'a Config,
    suffix: String,
}

impl<'a> Discovery<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            suffix: config.source_suffix(),
        }
    }

    /// Discover modules and misc files. A missing target root yields an empty tree.
    pub fn discover(&self) -> Result<SourceTree> {
        let root = self.config.target.clone();
        if !root.is_dir() {
            warn!("Target directory {:?} does not exist, nothing to bundle", root);
            return Ok(SourceTree {
                root,
                ..SourceTree::default()
            });
        }

        let modules = self.discover_modules()?;
        let misc_files = self.discover_misc_files()?;
        debug!(
            "Discovered {} modules and {} misc files under {:?}",
            modules.len(),
            misc_files.len(),
            root
        );

        Ok(SourceTree {
            root,
            modules,
            misc_files,
        })
    }

    /// Each immediate subdirectory of the modules directory becomes a module
    pub fn discover_modules(&self) -> Result<Vec<Module>> {
        let modules_path = self.config.modules_path();
        if !modules_path.is_dir() {
            debug!("No modules directory at {:?}", modules_path);
            return Ok(Vec::new());
        }

        let mut modules = Vec::new();
        let entries = WalkDir::new(&modules_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to list modules directory: {:?}", modules_path))?;
            if entry.path_is_symlink() && entry.path().is_dir() {
                debug!("Skipping symlinked module directory {:?}", entry.path());
                continue;
            }
            if !entry.file_type().is_dir() {
                trace!("Skipping non-directory entry {:?}", entry.path());
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let files = self.collect_sources(entry.path(), |_| true)?;
            debug!("Module {} has {} files", name, files.len());
            modules.push(Module { name, files });
        }

        Ok(modules)
    }

    /// Matching files outside the modules subtree and outside denylisted directories
    pub fn discover_misc_files(&self) -> Result<Vec<MiscFile>> {
        let root = &self.config.target;
        let files = self.collect_sources(root, |entry| !self.is_excluded_dir(root, entry))?;

        Ok(files
            .into_iter()
            .map(|path| {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                MiscFile { path, relative }
            })
            .collect())
    }

    /// Whether the misc walk should prune this entry and everything below it
    fn is_excluded_dir(&self, root: &Path, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());

        if relative
            .components()
            .any(|c| c.as_os_str() == self.config.modules_dir.as_str())
        {
            trace!("Skipping modules subtree {:?}", entry.path());
            return true;
        }

        let relative = relative.to_string_lossy();
        let excluded = self
            .config
            .excluded_dirs
            .iter()
            .any(|fragment| !fragment.is_empty() && relative.contains(fragment.as_str()));
        if excluded {
            debug!("Skipping excluded directory {:?}", entry.path());
        }
        excluded
    }

    /// Recursively collect files with the source suffix, in file-name order
    fn collect_sources(
        &self,
        dir: &Path,
        keep: impl FnMut(&DirEntry) -> bool,
    ) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(keep);

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk directory: {:?}", dir))?;
            if entry.file_type().is_dir() || !has_suffix(entry.path(), &self.suffix) {
                continue;
            }
            files.push(entry.into_path());
        }

        Ok(files)
    }
}
