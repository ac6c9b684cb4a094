// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for xunit-merge, read from TOML.
//!
//! The embedded default config is always loaded first, and a config file is layered on top of
//! it. Command-line options are applied on top of the result by the caller.

use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;

/// Settings loaded from the default config and a config file.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct MergeConfig {
    pub(crate) output: OutputConfig,
    pub(crate) suite: SuiteConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct OutputConfig {
    pub(crate) indent: usize,
    pub(crate) cdata_tags: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct SuiteConfig {
    #[serde(default)]
    pub(crate) name: Option<String>,
    pub(crate) deny_duplicates: bool,
}

impl MergeConfig {
    /// The default location of the config, relative to the current directory.
    pub const CONFIG_PATH: &'static str = ".config/xunit-merge.toml";

    /// Contains the default config as a TOML file.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from `config_file`, layered over the default config.
    ///
    /// If `required` is false, a missing file is the same as an empty one. `unknown_callback` is
    /// called once for each key in the file that isn't recognized.
    pub fn from_file(
        config_file: &Utf8Path,
        required: bool,
        mut unknown_callback: impl FnMut(&Utf8Path, &str),
    ) -> Result<Self, ConfigParseError> {
        let builder = Self::make_default_config()
            .add_source(File::new(config_file.as_str(), FileFormat::Toml).required(required));

        let (config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|err| ConfigParseError::new(config_file, err))?;

        for key in &unknown {
            unknown_callback(config_file, key);
        }

        Ok(config)
    }

    /// Returns the default config.
    #[cfg(test)]
    pub(crate) fn default_config() -> Self {
        let (config, unknown) = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");

        // The default config is shipped with this binary, so it must not have unknown keys.
        assert!(
            unknown.is_empty(),
            "found unknown keys in default config: {unknown:?}"
        );
        config
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    // This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(Self, BTreeSet<String>), ConfigError> {
        let config = builder.build_cloned()?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config = Self::deserialize(ignored_de)?;

        Ok((config, ignored))
    }
}

/// An error that occurred while reading a config file.
#[derive(Debug, Error)]
#[error("failed to parse config file `{config_file}`")]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file that failed to parse.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }
}
