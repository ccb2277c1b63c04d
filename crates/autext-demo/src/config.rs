//! Configuration loading with command-line overrides

use crate::cli::GlobalArgs;
use autext_classifiers::DetectorConfig;
use std::path::Path;

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "autext.yaml";

/// Load the detector configuration and apply CLI overrides.
///
/// An explicitly named file must exist; otherwise `./autext.yaml` is used when
/// present and built-in defaults when not.
pub fn load_config(args: &GlobalArgs) -> anyhow::Result<DetectorConfig> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            DetectorConfig::from_file(DEFAULT_CONFIG_FILE)?
        }
        None => DetectorConfig::default(),
    };

    // Apply CLI overrides
    if let Some(vocab_dir) = &args.vocab_dir {
        config.vocab_dir = vocab_dir.clone();
    }

    if let Some(cache_dir) = &args.cache_dir {
        config.cache_dir = cache_dir.clone();
    }

    if let Some(languages) = &args.languages {
        config.languages = languages.clone();
    }

    config.validate()?;
    Ok(config)
}
