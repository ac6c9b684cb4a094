// Copyright (c) The xunit-merge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use std::{
    borrow::Cow,
    collections::HashMap,
    ffi::OsString,
    fmt,
    process::{Command, ExitStatus},
};

#[derive(Clone, Debug)]
pub struct XunitMergeCli {
    args: Vec<String>,
    envs: HashMap<OsString, OsString>,
    current_dir: Option<Utf8PathBuf>,
    unchecked: bool,
}

impl XunitMergeCli {
    pub fn new() -> Self {
        Self {
            args: vec![],
            envs: HashMap::new(),
            current_dir: None,
            unchecked: false,
        }
    }

    pub fn args(&mut self, arg: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(arg.into_iter().map(Into::into));
        self
    }

    pub fn env(&mut self, k: impl Into<OsString>, v: impl Into<OsString>) -> &mut Self {
        self.envs.insert(k.into(), v.into());
        self
    }

    pub fn current_dir(&mut self, dir: impl Into<Utf8PathBuf>) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn unchecked(&mut self, unchecked: bool) -> &mut Self {
        self.unchecked = unchecked;
        self
    }

    pub fn output(&self) -> XunitMergeOutput {
        let mut command = Command::new(env!("CARGO_BIN_EXE_xunit-merge"));
        command.args(&self.args);
        // Keep the output free of ANSI escapes and of settings from the environment.
        command.env("CARGO_TERM_COLOR", "never");
        command.env_remove("XUNIT_MERGE_LOG");
        command.env_remove("XUNIT_MERGE_OUTPUT");
        command.env_remove("XUNIT_MERGE_VERBOSE");
        command.envs(&self.envs);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        let output = command.output().expect("failed to execute");

        let ret = XunitMergeOutput {
            command,
            exit_status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        };

        if !self.unchecked && !output.status.success() {
            panic!("command failed:\n\n{ret}");
        }

        ret
    }
}

pub struct XunitMergeOutput {
    pub command: Command,
    pub exit_status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl XunitMergeOutput {
    pub fn stdout_as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

impl fmt::Display for XunitMergeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command: {:?}\nexit code: {:?}\n\
                   --- stdout ---\n{}\n\n--- stderr ---\n{}\n\n",
            self.command,
            self.exit_status.code(),
            String::from_utf8_lossy(&self.stdout),
            String::from_utf8_lossy(&self.stderr)
        )
    }
}

// Make Debug output the same as Display output, so `.unwrap()` and `.expect()` are nicer.
impl fmt::Debug for XunitMergeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
