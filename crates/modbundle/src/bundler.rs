use anyhow::{Context, Result};
use log::{debug, error, info};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::discovery::{Discovery, MiscFile, Module, SourceTree};
use crate::transform::transform_source;
use crate::util::{display_path, flatten_relative_path};

/// Prefix of every misc-file bundle name
pub const MISC_PREFIX: &str = "Misc_";

/// What a run produced. Unreadable files are reported as they happen and not counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleSummary {
    pub module_bundles: usize,
    pub misc_bundles: usize,
    pub files_bundled: usize,
}

/// Writes module and misc-file bundles for one configuration
#[derive(Debug)]
pub struct Bundler {
    config: Config,
}

impl Bundler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover the target tree and write every bundle into the output directory
    pub fn run(&self) -> Result<BundleSummary> {
        info!(
            "Bundling {:?} into {:?}",
            self.config.target, self.config.output_dir
        );

        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {:?}",
                self.config.output_dir
            )
        })?;

        let tree = Discovery::new(&self.config).discover()?;
        let summary = self.write_bundles(&tree)?;

        info!(
            "✅ Done! {} module bundles and {} misc bundles saved in '{}'",
            summary.module_bundles,
            summary.misc_bundles,
            self.config.output_dir.display()
        );
        Ok(summary)
    }

    /// Write one bundle per module, then one per misc file
    pub fn write_bundles(&self, tree: &SourceTree) -> Result<BundleSummary> {
        let mut summary = BundleSummary::default();

        for module in &tree.modules {
            summary.files_bundled += self.write_module_bundle(&tree.root, module)?;
            summary.module_bundles += 1;
        }

        for misc in &tree.misc_files {
            if self.write_misc_bundle(&tree.root, misc)? {
                summary.files_bundled += 1;
                summary.misc_bundles += 1;
            }
        }

        Ok(summary)
    }

    /// `<module>.<ext>.txt`
    pub fn module_bundle_name(&self, module_name: &str) -> String {
        format!("{}.{}.txt", module_name, self.config.extension)
    }

    /// `Misc_<relative path with separators replaced by _>.<ext>.txt`
    pub fn misc_bundle_name(&self, relative: &Path) -> String {
        format!(
            "{}{}.{}.txt",
            MISC_PREFIX,
            flatten_relative_path(relative),
            self.config.extension
        )
    }

    fn bundle_path(&self, file_name: &str) -> PathBuf {
        self.config.output_dir.join(file_name)
    }

    /// Returns the number of files that made it into the bundle
    fn write_module_bundle(&self, root: &Path, module: &Module) -> Result<usize> {
        let out_path = self.bundle_path(&self.module_bundle_name(&module.name));
        debug!("Writing module {} to {:?}", module.name, out_path);

        let file = File::create(&out_path)
            .with_context(|| format!("Failed to create bundle file: {:?}", out_path))?;
        let mut out = BufWriter::new(file);
        let written = write_module_contents(&mut out, root, module)
            .and_then(|written| out.flush().map(|()| written))
            .with_context(|| format!("Failed to write bundle file: {:?}", out_path))?;

        info!(
            "Module {}: {} of {} files bundled",
            module.name,
            written,
            module.files.len()
        );
        Ok(written)
    }

    /// Returns false when the source could not be read and no bundle was written
    fn write_misc_bundle(&self, root: &Path, misc: &MiscFile) -> Result<bool> {
        let Some(content) = read_source(&misc.path) else {
            return Ok(false);
        };

        let out_path = self.bundle_path(&self.misc_bundle_name(&misc.relative));
        debug!("Writing misc file {:?} to {:?}", misc.relative, out_path);

        let mut bundle = format!(
            "// === ✅ Misc File: {} ===\n\n",
            display_path(root, &misc.path).display()
        );
        bundle.push_str(&content);
        fs::write(&out_path, bundle)
            .with_context(|| format!("Failed to write bundle file: {:?}", out_path))?;

        Ok(true)
    }
}

/// Module header, then a path marker and the transformed content for every readable file
fn write_module_contents(
    out: &mut impl Write,
    root: &Path,
    module: &Module,
) -> std::io::Result<usize> {
    write!(out, "// === ✅ Module: {} ===\n\n", module.name)?;

    let mut written = 0;
    for path in &module.files {
        let Some(content) = read_source(path) else {
            continue;
        };
        write!(out, "\n// --- {} ---\n", display_path(root, path).display())?;
        out.write_all(content.as_bytes())?;
        written += 1;
    }
    Ok(written)
}

/// Read and transform one source file. Read failures are reported and yield `None`.
fn read_source(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(transform_source(&content)),
        Err(err) => {
            error!("❌ Error reading {}: {}", path.display(), err);
            None
        }
    }
}
