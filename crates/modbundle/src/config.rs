use anyhow::{Context, Result, anyhow};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Component, Path, PathBuf};

use crate::combine::Combine;
use crate::dirs::ConfigSources;

/// Directory fragments skipped while walking for misc files.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 6] = [
    ".xcworkspace",
    ".xcodeproj",
    "DerivedData",
    "__pycache__",
    "TidyNotesTests",
    "TidyNotesUITests",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the source tree to bundle
    pub target: PathBuf,

    /// Name of the subdirectory of `target` whose children are modules
    pub modules_dir: String,

    /// Directory receiving the bundles
    pub output_dir: PathBuf,

    /// Source file extension, without the leading dot
    pub extension: String,

    /// Directory name fragments excluded from the misc-file walk (case-sensitive substrings)
    pub excluded_dirs: IndexSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: PathBuf::from("TidyNotes"),
            modules_dir: "Modules".to_owned(),
            output_dir: PathBuf::from("AI Integration"),
            extension: "swift".to_owned(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|dir| (*dir).to_owned())
                .collect(),
        }
    }
}

/// One configuration layer. Keys a layer does not set stay `None` and fall through to lower
/// layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub target: Option<PathBuf>,
    pub modules_dir: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub excluded_dirs: Option<IndexSet<String>>,
}

impl Combine for ConfigLayer {
    fn combine(self, other: Self) -> Self {
        Self {
            target: self.target.combine(other.target),
            modules_dir: self.modules_dir.combine(other.modules_dir),
            output_dir: self.output_dir.combine(other.output_dir),
            extension: self.extension.combine(other.extension),
            excluded_dirs: self.excluded_dirs.combine(other.excluded_dirs),
        }
    }
}

impl ConfigLayer {
    /// Load the layer from environment variables with MODBUNDLE_ prefix
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the env layer from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        // MODBUNDLE_EXCLUDED_DIRS - comma-separated list of directory fragments
        let excluded_dirs = non_empty("MODBUNDLE_EXCLUDED_DIRS").and_then(|value| {
            let dirs: IndexSet<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            (!dirs.is_empty()).then_some(dirs)
        });

        Self {
            target: non_empty("MODBUNDLE_TARGET").map(PathBuf::from),
            modules_dir: non_empty("MODBUNDLE_MODULES_DIR"),
            output_dir: non_empty("MODBUNDLE_OUTPUT_DIR").map(PathBuf::from),
            extension: non_empty("MODBUNDLE_EXTENSION"),
            excluded_dirs,
        }
    }

    /// Parse and check a single config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut layer: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        layer
            .validate()
            .with_context(|| format!("Invalid value in config file: {:?}", path))?;

        Ok(layer)
    }

    /// Check the keys this layer sets, normalizing the extension
    pub fn validate(&mut self) -> Result<()> {
        self.extension = self
            .extension
            .as_deref()
            .map(Config::checked_extension)
            .transpose()?;
        if let Some(modules_dir) = &self.modules_dir {
            Config::check_modules_dir(modules_dir)?;
        }
        Ok(())
    }

    /// Overwrite every key of `config` that this layer sets
    pub fn apply_to(self, mut config: Config) -> Config {
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(modules_dir) = self.modules_dir {
            config.modules_dir = modules_dir;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(extension) = self.extension {
            config.extension = extension;
        }
        if let Some(excluded_dirs) = self.excluded_dirs {
            config.excluded_dirs = excluded_dirs;
        }
        config
    }
}

impl Config {
    /// Set the source extension, tolerating a leading dot (`.swift` and `swift` are the same)
    pub fn set_extension(&mut self, extension: &str) -> Result<()> {
        let extension = Self::normalize_extension(extension);
        if extension.is_empty() {
            return Err(anyhow!("Source extension must not be empty"));
        }
        self.extension = extension.to_owned();
        Ok(())
    }

    fn normalize_extension(extension: &str) -> &str {
        extension.trim().trim_start_matches('.')
    }

    fn checked_extension(extension: &str) -> Result<String> {
        let normalized = Self::normalize_extension(extension);
        if normalized.is_empty() {
            return Err(anyhow!(
                "Invalid extension '{}': must not be empty",
                extension
            ));
        }
        Ok(normalized.to_owned())
    }

    fn check_modules_dir(modules_dir: &str) -> Result<()> {
        let mut components = Path::new(modules_dir).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(anyhow!(
                "Invalid modules_dir '{}': expected a single directory name",
                modules_dir
            )),
        }
    }

    /// Suffix a file name must end with to be bundled, e.g. `.swift`
    pub fn source_suffix(&self) -> String {
        format!(".{}", self.extension)
    }

    /// Path of the directory whose children are modules
    pub fn modules_path(&self) -> PathBuf {
        self.target.join(&self.modules_dir)
    }

    /// Check the values that cannot be expressed by the types alone
    pub fn validate(&mut self) -> Result<()> {
        self.extension = Self::checked_extension(&self.extension)?;
        Self::check_modules_dir(&self.modules_dir)
    }

    /// Load a single config file on top of the defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(ConfigLayer::from_file(path)?.apply_to(Self::default()))
    }

    fn load_layer(path: &Path, label: &str) -> Result<ConfigLayer> {
        log::debug!("Loading {} from: {:?}", label, path);
        ConfigLayer::from_file(path)
            .with_context(|| format!("Failed to load {} from {:?}", label, path))
    }

    /// Load configuration with hierarchical precedence:
    /// 1. CLI-provided config path (highest precedence)
    /// 2. Environment variables (MODBUNDLE_*)
    /// 3. Project config (modbundle.toml in current directory)
    /// 4. User config (~/.config/modbundle/modbundle.toml)
    /// 5. System config (/etc/modbundle/modbundle.toml or equivalent)
    /// 6. Default values (lowest precedence)
    pub fn load(cli_config_path: Option<&Path>) -> Result<Self> {
        Self::load_layered(
            &ConfigSources::discover(),
            ConfigLayer::from_env(),
            cli_config_path,
        )
    }

    /// Merge the file layers in `sources`, then `env_layer`, then the CLI file, and apply the
    /// result onto the defaults once
    pub fn load_layered(
        sources: &ConfigSources,
        env_layer: ConfigLayer,
        cli_config_path: Option<&Path>,
    ) -> Result<Self> {
        let mut merged = ConfigLayer::default();

        for (label, path) in sources.by_precedence() {
            if path.exists() {
                merged = Self::load_layer(path, label)?.combine(merged);
            }
        }

        merged = env_layer.combine(merged);

        if let Some(cli_config_path) = cli_config_path {
            // An explicitly requested file must exist.
            if !cli_config_path.exists() {
                return Err(anyhow!("Config file not found: {:?}", cli_config_path));
            }
            merged = Self::load_layer(cli_config_path, "CLI config")?.combine(merged);
        }

        let mut config = merged.apply_to(Self::default());
        config
            .validate()
            .context("Invalid value in final configuration")?;

        Ok(config)
    }
}
