// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parse, merge, transform and write reports in one go.

use crate::{
    aggregate::SuiteCounts,
    document::Element,
    errors::{BoxError, RunError},
    merge::{MergeWarning, merge},
    parse::parse_document,
    serialize::{CdataStrategy, DEFAULT_INDENT, Serializer},
};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::Utf8Path;
use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
};

/// A single input report: a name used in error messages, and a reader for its contents.
pub struct MergeInput<R> {
    name: String,
    reader: R,
}

impl<R: BufRead> MergeInput<R> {
    /// Creates a new input.
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }

    /// Returns the name of this input.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl MergeInput<BufReader<File>> {
    /// Opens a file as an input. The path is used as the name.
    pub fn open(path: &Utf8Path) -> Result<Self, RunError> {
        let file = File::open(path).map_err(|err| RunError::OpenInput {
            path: path.to_owned(),
            err,
        })?;
        Ok(Self::new(path.as_str(), BufReader::new(file)))
    }
}

impl<R> fmt::Debug for MergeInput<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeInput")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What happened during a successful run.
#[derive(Clone, Debug)]
pub struct MergeSummary {
    /// The number of inputs that were merged.
    pub input_count: usize,

    /// The counts of the merged suite, or `None` if a single input was passed through unchanged.
    pub counts: Option<SuiteCounts>,

    /// Non-fatal issues found while merging.
    pub warnings: Vec<MergeWarning>,
}

type TransformFn<'a> = dyn FnOnce(&mut Element) -> Result<Option<Element>, BoxError> + 'a;

/// Merges XUnit reports: parses every input, merges them, optionally transforms the result, and
/// writes it out with CDATA text for status and output elements.
///
/// # Examples
///
/// ```
/// use xunit_merge_core::{MergeInput, XunitMerger};
///
/// let first = r#"<testsuite name="a"><testcase name="p"/><testcase name="q"><skipped/></testcase></testsuite>"#;
/// let second = r#"<testsuite name="b"><testcase name="q"/></testsuite>"#;
///
/// let mut output = Vec::new();
/// let summary = XunitMerger::new()
///     .run(
///         [
///             MergeInput::new("first.xml", first.as_bytes()),
///             MergeInput::new("second.xml", second.as_bytes()),
///         ],
///         &mut output,
///     )
///     .unwrap();
///
/// assert_eq!(summary.counts.unwrap().tests, 2);
/// ```
pub struct XunitMerger<'a> {
    indent: Option<usize>,
    strategy: CdataStrategy,
    transform: Option<Box<TransformFn<'a>>>,
}

impl<'a> XunitMerger<'a> {
    /// Creates a new merger with the default settings.
    pub fn new() -> Self {
        Self {
            indent: Some(DEFAULT_INDENT),
            strategy: CdataStrategy::default(),
            transform: None,
        }
    }

    /// Sets the indentation width of the output. `None` or `Some(0)` disables indentation.
    pub fn set_indent(&mut self, indent: Option<usize>) -> &mut Self {
        self.indent = indent;
        self
    }

    /// Sets the tags whose text is written as CDATA.
    pub fn set_cdata_tags(&mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.strategy = CdataStrategy::new(tags);
        self
    }

    /// Sets a transform that is called with the merged suite before it is written.
    ///
    /// The transform may modify the suite in place and return `Ok(None)`, or return a
    /// replacement suite. Errors are returned from [`run`](Self::run) as
    /// [`RunError::Transform`].
    pub fn set_transform<F>(&mut self, transform: F) -> &mut Self
    where
        F: FnOnce(&mut Element) -> Result<Option<Element>, BoxError> + 'a,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Runs the merge over the given inputs, writing the merged report to `output`.
    ///
    /// Inputs are read in order, and each one is dropped as soon as it is parsed. Nothing is
    /// written if any input fails to parse.
    pub fn run<R: BufRead>(
        &mut self,
        inputs: impl IntoIterator<Item = MergeInput<R>>,
        output: impl Write,
    ) -> Result<MergeSummary, RunError> {
        let suites = inputs
            .into_iter()
            .map(parse_input)
            .collect::<Result<Vec<_>, _>>()?;
        self.merge_and_write(suites, output)
    }

    /// Runs the merge over the given files, writing the merged report to `output_path`.
    ///
    /// The output file is replaced atomically, so a failed run leaves any existing file untouched.
    pub fn run_files(
        &mut self,
        input_paths: impl IntoIterator<Item = impl AsRef<Utf8Path>>,
        output_path: &Utf8Path,
    ) -> Result<MergeSummary, RunError> {
        let suites = parse_files(input_paths)?;

        let file = AtomicFile::new(output_path, OverwriteBehavior::AllowOverwrite);
        file.write(|file| self.merge_and_write(suites, BufWriter::new(file)))
            .map_err(|err| match err {
                atomicwrites::Error::Internal(err) => RunError::WriteOutput {
                    path: output_path.to_owned(),
                    err,
                },
                atomicwrites::Error::User(err) => err,
            })
    }

    /// Runs the merge over the given files, writing the merged report to `output`.
    pub fn run_files_to_writer(
        &mut self,
        input_paths: impl IntoIterator<Item = impl AsRef<Utf8Path>>,
        output: impl Write,
    ) -> Result<MergeSummary, RunError> {
        let suites = parse_files(input_paths)?;
        self.merge_and_write(suites, output)
    }

    fn merge_and_write(
        &mut self,
        suites: Vec<Element>,
        mut output: impl Write,
    ) -> Result<MergeSummary, RunError> {
        let input_count = suites.len();
        let merged = merge(suites)?;
        let mut suite = merged.suite;

        if let Some(transform) = self.transform.take() {
            if let Some(replacement) = transform(&mut suite).map_err(RunError::Transform)? {
                suite = replacement;
            }
        }

        let mut serializer = Serializer::new(&self.strategy);
        serializer.set_indent(self.indent);
        serializer.serialize(&suite, &mut output)?;
        output
            .flush()
            .map_err(|err| RunError::Serialize(err.into()))?;

        Ok(MergeSummary {
            input_count,
            counts: merged.counts,
            warnings: merged.warnings,
        })
    }
}

impl Default for XunitMerger<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for XunitMerger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XunitMerger")
            .field("indent", &self.indent)
            .field("strategy", &self.strategy)
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}

/// Merges the given inputs with the default settings, writing the result to `output`.
pub fn run<R: BufRead>(
    inputs: impl IntoIterator<Item = MergeInput<R>>,
    output: impl Write,
) -> Result<MergeSummary, RunError> {
    XunitMerger::new().run(inputs, output)
}

fn parse_files(
    input_paths: impl IntoIterator<Item = impl AsRef<Utf8Path>>,
) -> Result<Vec<Element>, RunError> {
    // Each file is closed as soon as it has been parsed.
    input_paths
        .into_iter()
        .map(|path| MergeInput::open(path.as_ref()).and_then(parse_input))
        .collect()
}

fn parse_input<R: BufRead>(input: MergeInput<R>) -> Result<Element, RunError> {
    let MergeInput { name, reader } = input;
    tracing::debug!("parsing `{name}`");
    parse_document(reader).map_err(|err| RunError::Parse {
        source_name: name,
        err,
    })
}
