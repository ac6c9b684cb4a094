// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, XunitMergeExitCode,
    config::MergeConfig,
    errors::Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use xunit_merge_core::{MergeSummary, XunitMerger};

/// Merge XUnit/JUnit XML reports from sharded or repeated test runs.
///
/// Test cases are matched by name. A test that completed in any input replaces skipped
/// occurrences of it in every other input, and the merged suite's counts are recomputed.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct XunitMergeApp {
    /// XUnit reports to merge, in order
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<Utf8PathBuf>,

    /// Where to write the merged report, or `-` for standard output
    #[arg(long, short, value_name = "PATH", env = "XUNIT_MERGE_OUTPUT")]
    output: Utf8PathBuf,

    /// Config file [default: .config/xunit-merge.toml, if present]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Spaces to indent each level of the merged report by, or 0 for none
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Rename the merged suite
    #[arg(long, value_name = "NAME")]
    suite_name: Option<String>,

    /// Exit with an error if a test completed in more than one place
    #[arg(long)]
    deny_duplicates: bool,

    #[command(flatten)]
    output_opts: OutputOpts,
}

impl XunitMergeApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output_opts.init()
    }

    /// Executes the app.
    pub fn exec(self, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = self.load_config()?;
        let settings = MergeSettings::new(&self, config);

        let mut merger = XunitMerger::new();
        merger
            .set_indent(Some(settings.indent))
            .set_cdata_tags(settings.cdata_tags);
        if let Some(name) = settings.suite_name {
            merger.set_transform(move |suite| {
                suite.set_attribute("name", name);
                Ok(None)
            });
        }

        let summary = if self.output.as_str() == "-" {
            let mut stdout = output_writer.stdout_writer();
            merger.run_files_to_writer(&self.inputs, &mut stdout)?
        } else {
            merger.run_files(&self.inputs, &self.output)?
        };

        log_summary(&summary, &self.output);

        if settings.deny_duplicates && !summary.warnings.is_empty() {
            return Err(ExpectedError::DuplicatesDenied {
                count: summary.warnings.len(),
            });
        }

        Ok(XunitMergeExitCode::OK)
    }

    fn load_config(&self) -> Result<MergeConfig> {
        let (config_file, required) = match &self.config_file {
            Some(config_file) => (config_file.as_path(), true),
            None => (Utf8Path::new(MergeConfig::CONFIG_PATH), false),
        };

        let config = MergeConfig::from_file(config_file, required, |config_file, key| {
            tracing::warn!("ignoring unknown configuration key `{key}` in {config_file}");
        })?;
        Ok(config)
    }
}

/// Settings after applying command-line options on top of the config.
#[derive(Clone, Debug, PartialEq, Eq)]
struct MergeSettings {
    indent: usize,
    cdata_tags: Vec<String>,
    suite_name: Option<String>,
    deny_duplicates: bool,
}

impl MergeSettings {
    fn new(app: &XunitMergeApp, config: MergeConfig) -> Self {
        let MergeConfig { output, suite } = config;
        Self {
            indent: app.indent.unwrap_or(output.indent),
            cdata_tags: output.cdata_tags,
            suite_name: app.suite_name.clone().or(suite.name),
            deny_duplicates: app.deny_duplicates || suite.deny_duplicates,
        }
    }
}

fn log_summary(summary: &MergeSummary, output: &Utf8Path) {
    let destination = if output.as_str() == "-" {
        "standard output".to_owned()
    } else {
        format!("`{output}`")
    };

    match &summary.counts {
        Some(counts) => tracing::info!(
            "merged {} reports to {destination}: {counts}",
            summary.input_count
        ),
        None => tracing::info!("wrote single report unchanged to {destination}"),
    }
}
