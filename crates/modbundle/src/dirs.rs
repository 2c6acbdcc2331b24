use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use etcetera::BaseStrategy;

/// Directory holding `modbundle.toml` inside a config root
const CONFIG_DIR: &str = "modbundle";

/// Configuration file name
pub const CONFIG_FILE: &str = "modbundle.toml";

/// Where the config files of each layer live. Missing files are skipped at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    pub system: Option<PathBuf>,
    pub user: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl ConfigSources {
    /// Locate the system and user files for this platform and the project file in the
    /// current directory.
    pub fn discover() -> Self {
        Self {
            system: system_config_file(),
            user: user_config_file(),
            project: Some(PathBuf::from(CONFIG_FILE)),
        }
    }

    /// Files from lowest to highest precedence, labelled for error messages
    pub fn by_precedence(&self) -> impl Iterator<Item = (&'static str, &Path)> {
        [
            ("system config", self.system.as_deref()),
            ("user config", self.user.as_deref()),
            ("project config", self.project.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, path)| path.map(|path| (label, path)))
    }
}

fn config_file_in(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// `$XDG_CONFIG_HOME/modbundle/modbundle.toml` (or `~/.config/...`) on Unix, the roaming
/// AppData directory on Windows
fn user_config_file() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(config_file_in(&strategy.config_dir()))
}

/// Every place a system config may live, in lookup order.
///
/// `XDG_CONFIG_DIRS` entries (default `/etc/xdg`) up to the first empty one, then `/etc`.
#[cfg(not(windows))]
fn system_candidates(xdg_config_dirs: Option<&str>) -> Vec<PathBuf> {
    xdg_config_dirs
        .filter(|dirs| !dirs.is_empty())
        .unwrap_or("/etc/xdg")
        .split(':')
        .take_while(|dir| !dir.is_empty())
        .chain(["/etc"])
        .map(|dir| config_file_in(Path::new(dir)))
        .collect()
}

/// `%SYSTEMDRIVE%\ProgramData\modbundle\modbundle.toml`
#[cfg(windows)]
fn system_candidates(system_drive: Option<&str>) -> Vec<PathBuf> {
    system_drive
        .map(|drive| config_file_in(&Path::new(drive).join("ProgramData")))
        .into_iter()
        .collect()
}

fn first_existing_file(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|candidate| match fs::metadata(candidate) {
            Ok(metadata) => metadata.is_file(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                log::warn!("Failed to query system configuration file {candidate:?}: {err}");
                false
            }
        })
}

fn system_config_file() -> Option<PathBuf> {
    #[cfg(windows)]
    let hint = env::var("SYSTEMDRIVE").ok();
    #[cfg(not(windows))]
    let hint = env::var("XDG_CONFIG_DIRS").ok();

    first_existing_file(system_candidates(hint.as_deref()))
}
