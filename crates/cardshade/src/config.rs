use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use poolconfig::PoolConfig;
use scheduler::SchedulerSettings;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Loads the explicit `--config` file, else the default file when present,
/// else built-in defaults. An explicit path that does not exist is an error.
pub fn load_config(explicit: Option<&Path>, paths: &AppPaths) -> Result<(PoolConfig, ConfigSource)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = paths.config_file();
            if !default.is_file() {
                tracing::debug!(path = %default.display(), "no config file; using defaults");
                return Ok((PoolConfig::default(), ConfigSource::Defaults));
            }
            default
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = PoolConfig::from_toml_str(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok((config, ConfigSource::File(path)))
}

/// Scheduler settings from the config with CLI overrides applied.
pub fn scheduler_settings(config: &PoolConfig, args: &RunArgs) -> Result<SchedulerSettings> {
    let mut settings = SchedulerSettings::from_config(config);
    if let Some(max_active) = args.max_active {
        settings = settings.with_max_active(max_active);
    }
    if let Some(fps) = args.fps {
        settings.target_fps = if fps > 0.0 { Some(fps) } else { None };
    }
    settings.validate().context("invalid scheduler settings")?;
    Ok(settings)
}

/// Variant pack directory: the configured one, else `variants/` next to the
/// config file.
pub fn pack_dir(config: &PoolConfig, paths: &AppPaths) -> PathBuf {
    config
        .variants
        .pack_dir
        .clone()
        .unwrap_or_else(|| paths.variant_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    use crate::cli::{Cli, Command};

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["cardshade", "run"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_config_dir(root.path().to_path_buf());
        let (config, source) = load_config(None, &paths).unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.pool.max_active, 20);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_config_dir(root.path().to_path_buf());
        let missing = root.path().join("nope.toml");
        assert!(load_config(Some(&missing), &paths).is_err());
    }

    #[test]
    fn default_file_is_read_when_present() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_config_dir(root.path().to_path_buf());
        fs::write(
            paths.config_file(),
            "version = 1\n[pool]\nmax_active = 6\nrestore_delay = \"250ms\"\n",
        )
        .unwrap();
        let (config, source) = load_config(None, &paths).unwrap();
        assert_eq!(source, ConfigSource::File(paths.config_file()));
        assert_eq!(config.pool.max_active, 6);
        assert_eq!(config.pool.restore_delay.as_millis(), 250);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let config = PoolConfig::default();
        let settings =
            scheduler_settings(&config, &run_args(&["--max-active", "3", "--fps", "0"])).unwrap();
        assert_eq!(settings.max_active, 3);
        assert_eq!(settings.target_fps, None);

        let settings = scheduler_settings(&config, &run_args(&["--fps", "30"])).unwrap();
        assert_eq!(settings.max_active, 20);
        assert_eq!(settings.target_fps, Some(30.0));
    }

    #[test]
    fn zero_capacity_from_cli_is_rejected() {
        let config = PoolConfig::default();
        assert!(scheduler_settings(&config, &run_args(&["--max-active", "0"])).is_err());
    }

    #[test]
    fn tiny_frame_cap_from_cli_is_rejected() {
        let config = PoolConfig::default();
        assert!(scheduler_settings(&config, &run_args(&["--fps", "1e-30"])).is_err());
        assert!(scheduler_settings(&config, &run_args(&["--fps", "0.5"])).is_err());
        let settings = scheduler_settings(&config, &run_args(&["--fps", "1"])).unwrap();
        assert_eq!(settings.target_fps, Some(1.0));
    }

    #[test]
    fn pack_dir_defaults_next_to_config() {
        let root = TempDir::new().unwrap();
        let paths = AppPaths::from_config_dir(root.path().to_path_buf());
        assert_eq!(pack_dir(&PoolConfig::default(), &paths), root.path().join("variants"));
    }
}
