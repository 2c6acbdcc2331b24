pub mod bundler;
pub mod combine;
pub mod config;
pub mod discovery;
pub mod dirs;
pub mod transform;
pub mod util;

pub use bundler::{BundleSummary, Bundler};
pub use config::Config;
