// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests that run the `xunit-merge` binary against reports in a temporary directory.

use camino::Utf8PathBuf;
use camino_tempfile::Utf8TempDir;
use indoc::indoc;
use pretty_assertions::assert_eq;
use xunit_merge::XunitMergeExitCode;

mod cli;

use cli::XunitMergeCli;

static FIRST_SHARD: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuite name="nosetests" tests="2" errors="0" failures="0" skip="1">
        <testcase classname="pkg.Foo" name="test_p" time="0.5">
            <system-out>P &amp; Q &lt;ok&gt;</system-out>
        </testcase>
        <testcase classname="pkg.Foo" name="test_q" time="0">
            <skipped type="SkipTest" message="run elsewhere">skipped</skipped>
        </testcase>
    </testsuite>
"#};

static SECOND_SHARD: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuite name="nosetests" tests="2" errors="0" failures="1" skip="1">
        <testcase classname="pkg.Foo" name="test_q" time="1.25">
            <failure type="AssertionError" message="1 != 2">Traceback: 1 != 2</failure>
        </testcase>
        <testcase classname="pkg.Foo" name="test_r" time="0">
            <skipped type="SkipTest" message="never runs">skipped</skipped>
        </testcase>
    </testsuite>
"#};

static MERGED: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuite name="nosetests" tests="2" errors="0" failures="1" skip="1" skipped="1" time="1.75">
        <testcase classname="pkg.Foo" name="test_p" time="0.5">
            <system-out><![CDATA[P & Q <ok>]]></system-out>
        </testcase>
        <testcase classname="pkg.Foo" name="test_q" time="1.25">
            <failure message="1 != 2" type="AssertionError"><![CDATA[Traceback: 1 != 2]]></failure>
        </testcase>
        <testcase classname="pkg.Foo" name="test_r" time="0">
            <skipped message="never runs" type="SkipTest"><![CDATA[skipped]]></skipped>
        </testcase>
    </testsuite>
"#};

struct TempReports {
    dir: Utf8TempDir,
}

impl TempReports {
    fn new() -> Self {
        Self {
            dir: Utf8TempDir::new().expect("temp dir created"),
        }
    }

    fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("created parent dir");
        }
        std::fs::write(&path, contents).expect("wrote file");
        path
    }

    fn path(&self, name: &str) -> Utf8PathBuf {
        self.dir.path().join(name)
    }

    fn shards(&self) -> [String; 2] {
        [
            self.write("first.xml", FIRST_SHARD).into_string(),
            self.write("second.xml", SECOND_SHARD).into_string(),
        ]
    }
}

#[test]
fn test_merge_to_file() {
    let reports = TempReports::new();
    let out = reports.path("merged.xml");

    let output = XunitMergeCli::new()
        .args(reports.shards())
        .args(["--output", out.as_str()])
        .output();

    assert_eq!(
        std::fs::read_to_string(&out).expect("merged report written"),
        MERGED
    );
    assert!(output.stdout.is_empty(), "{output}");
    assert!(
        output
            .stderr_as_str()
            .contains("info: merged 2 reports to `"),
        "summary is logged: {output}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("2 tests, 1 skipped, 1 failures, 0 errors in 1.75s"),
        "counts are logged: {output}"
    );
}

#[test]
fn test_merge_to_stdout() {
    let reports = TempReports::new();

    let output = XunitMergeCli::new()
        .args(reports.shards())
        .args(["-o", "-"])
        .output();

    assert_eq!(output.stdout_as_str(), MERGED);
}

#[test]
fn test_output_from_env() {
    let reports = TempReports::new();
    let out = reports.path("from-env.xml");

    XunitMergeCli::new()
        .args(reports.shards())
        .env("XUNIT_MERGE_OUTPUT", out.as_str())
        .output();

    assert_eq!(
        std::fs::read_to_string(&out).expect("merged report written"),
        MERGED
    );
}

#[test]
fn test_single_input_is_unchanged() {
    let reports = TempReports::new();
    let first = reports.write("first.xml", FIRST_SHARD);

    let output = XunitMergeCli::new()
        .args([first.as_str(), "-o", "-", "--indent", "0"])
        .output();

    let stdout = output.stdout_as_str();
    assert!(
        stdout.contains(r#"<testsuite name="nosetests" tests="2" errors="0" failures="0" skip="1">"#),
        "attributes are not recomputed: {output}"
    );
    assert!(!stdout.contains("skipped=\""), "{output}");
    assert!(
        output.stderr_as_str().contains("wrote single report unchanged"),
        "{output}"
    );
}

#[test]
fn test_malformed_input() {
    let reports = TempReports::new();
    let [first, _] = reports.shards();
    let bad = reports.write("bad.xml", "<testsuite><testcase name=\"a\"></testsuite>");
    let out = reports.path("merged.xml");

    let output = XunitMergeCli::new()
        .args([first.as_str(), bad.as_str(), "-o", out.as_str()])
        .unchecked(true)
        .output();

    assert_eq!(
        output.exit_status.code(),
        Some(XunitMergeExitCode::INPUT_ERROR),
        "{output}"
    );
    let stderr = output.stderr_as_str();
    assert!(stderr.contains("error: failed to parse input"), "{output}");
    assert!(stderr.contains("bad.xml"), "input is named: {output}");
    assert!(stderr.contains("Caused by:"), "{output}");
    assert!(!out.exists(), "no output is written: {output}");
}

#[test]
fn test_missing_input() {
    let reports = TempReports::new();
    let [first, _] = reports.shards();
    let missing = reports.path("missing.xml");

    let output = XunitMergeCli::new()
        .args([first.as_str(), missing.as_str(), "-o", "-"])
        .unchecked(true)
        .output();

    assert_eq!(
        output.exit_status.code(),
        Some(XunitMergeExitCode::INPUT_ERROR),
        "{output}"
    );
    assert!(
        output.stderr_as_str().contains("error: failed to open input"),
        "{output}"
    );
    assert!(output.stdout.is_empty(), "{output}");
}

#[test]
fn test_missing_case_name() {
    let reports = TempReports::new();
    let [first, _] = reports.shards();
    let nameless = reports.write(
        "nameless.xml",
        r#"<testsuite><testcase classname="pkg.Foo"/></testsuite>"#,
    );

    let output = XunitMergeCli::new()
        .args([first.as_str(), nameless.as_str(), "-o", "-"])
        .unchecked(true)
        .output();

    assert_eq!(
        output.exit_status.code(),
        Some(XunitMergeExitCode::MERGE_ERROR),
        "{output}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("test case 0 in input 1 has no `name` attribute"),
        "{output}"
    );
}

#[test]
fn test_duplicates() {
    let reports = TempReports::new();
    let [first, _] = reports.shards();
    let again = reports.write("again.xml", FIRST_SHARD);
    let out = reports.path("merged.xml");

    // Duplicates are reported but allowed by default.
    let output = XunitMergeCli::new()
        .args([first.as_str(), again.as_str(), "-o", out.as_str()])
        .output();
    assert!(
        output
            .stderr_as_str()
            .contains("warning: duplicate completed test case `test_p` in input 1"),
        "{output}"
    );

    // With --deny-duplicates, the report is still written but the exit code is an error.
    std::fs::remove_file(&out).expect("removed merged report");
    let output = XunitMergeCli::new()
        .args([first.as_str(), again.as_str(), "-o", out.as_str()])
        .args(["--deny-duplicates"])
        .unchecked(true)
        .output();

    assert_eq!(
        output.exit_status.code(),
        Some(XunitMergeExitCode::MERGE_ERROR),
        "{output}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("error: found 1 duplicate completed test case"),
        "{output}"
    );
    assert!(out.exists(), "merged report is written: {output}");
}

#[test]
fn test_config_file() {
    let reports = TempReports::new();
    let config = reports.write(
        "ci.toml",
        indoc! {r#"
            [output]
            indent = 0
            cdata-tags = []

            [suite]
            name = "merged"
            unknown-key = 1
        "#},
    );

    let output = XunitMergeCli::new()
        .args(reports.shards())
        .args(["-o", "-", "--config-file", config.as_str()])
        .output();

    let stdout = output.stdout_as_str();
    assert!(
        stdout.starts_with(
            r#"<?xml version="1.0" encoding="UTF-8"?><testsuite name="merged" tests="2""#
        ),
        "config is applied: {output}"
    );
    assert!(
        stdout.contains("<system-out>P &amp; Q &lt;ok&gt;</system-out>"),
        "no CDATA tags: {output}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("warning: ignoring unknown configuration key `suite.unknown-key`"),
        "{output}"
    );

    // Command-line options take precedence.
    let output = XunitMergeCli::new()
        .args(reports.shards())
        .args(["-o", "-", "--config-file", config.as_str()])
        .args(["--suite-name", "from-cli", "--indent", "2"])
        .output();
    assert!(
        output
            .stdout_as_str()
            .contains("<testsuite name=\"from-cli\""),
        "{output}"
    );
    assert!(output.stdout_as_str().contains("\n  <testcase"), "{output}");
}

#[test]
fn test_default_config_location() {
    let reports = TempReports::new();
    let shards = reports.shards();
    reports.write(".config/xunit-merge.toml", "[suite]\nname = \"from-default\"\n");

    let output = XunitMergeCli::new()
        .args(shards)
        .args(["-o", "-"])
        .current_dir(reports.dir.path())
        .output();

    assert!(
        output
            .stdout_as_str()
            .contains("<testsuite name=\"from-default\""),
        "{output}"
    );
}

#[test]
fn test_invalid_config() {
    let reports = TempReports::new();
    let config = reports.write("ci.toml", "[output]\nindent = \"wide\"\n");

    let output = XunitMergeCli::new()
        .args(reports.shards())
        .args(["-o", "-", "--config-file", config.as_str()])
        .unchecked(true)
        .output();

    assert_eq!(
        output.exit_status.code(),
        Some(XunitMergeExitCode::SETUP_ERROR),
        "{output}"
    );
    assert!(
        output
            .stderr_as_str()
            .contains("error: failed to parse config file"),
        "{output}"
    );
    assert!(output.stdout.is_empty(), "{output}");
}
