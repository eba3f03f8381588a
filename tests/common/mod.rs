#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use dj_beat_drop::bootstrap::{CommandOutput, CommandRunner, CommandSpec};
use dj_beat_drop::config::BUNDLED_TEMPLATES_DIR;
use dj_beat_drop::error::{Error, Result};
use dj_beat_drop::materializer::TemplateStore;
use dj_beat_drop::releases::{ReleaseCatalog, ReleaseIndex};

/// Release index answering from a fixed catalog and counting fetches.
pub struct FakeIndex {
    catalog: Option<ReleaseCatalog>,
    pub fetches: Cell<usize>,
}

impl FakeIndex {
    pub fn new(latest: &str, releases: &[&str]) -> Self {
        Self {
            catalog: Some(ReleaseCatalog {
                latest: latest.to_string(),
                releases: releases.iter().map(|r| r.to_string()).collect(),
            }),
            fetches: Cell::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self { catalog: None, fetches: Cell::new(0) }
    }

    /// Latest release is 6.0.1, the LTS line is at 5.2.7.
    pub fn modern() -> Self {
        Self::new(
            "6.0.1",
            &["4.2", "4.2.20", "5.0", "5.1", "5.1.5", "5.2a1", "5.2b1", "5.2rc1", "5.2", "5.2.7", "6.0", "6.0.1"],
        )
    }

    /// Latest release is on the 4.2 line, below the SQLite tuning threshold.
    pub fn legacy() -> Self {
        Self::new("4.2.20", &["4.1", "4.1.13", "4.2", "4.2.20"])
    }
}

impl ReleaseIndex for FakeIndex {
    fn fetch(&self) -> Result<ReleaseCatalog> {
        self.fetches.set(self.fetches.get() + 1);
        self.catalog.clone().ok_or_else(|| Error::Fetch {
            url: "https://index.invalid/Django/json".to_string(),
            reason: "status 503 Service Unavailable".to_string(),
        })
    }
}

/// Command runner that records invocations instead of spawning processes.
pub struct RecordingRunner {
    pub commands: RefCell<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self { commands: RefCell::new(Vec::new()), fail_on: None }
    }

    pub fn failing_on(command: &str) -> Self {
        Self { commands: RefCell::new(Vec::new()), fail_on: Some(command.to_string()) }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec, cwd: &Path) -> Result<CommandOutput> {
        let rendered = command.to_string();
        self.commands.borrow_mut().push(rendered.clone());

        // Mimic `uv init` leaving a sample script behind.
        if rendered == "uv init" {
            fs::write(cwd.join("hello.py"), "print('hello')\n")?;
        }

        let success = self.fail_on.as_deref() != Some(rendered.as_str());
        Ok(CommandOutput {
            success,
            status: if success { "exit status: 0" } else { "exit status: 2" }.to_string(),
            stdout: String::new(),
            stderr: if success { String::new() } else { "boom".to_string() },
        })
    }
}

pub fn bundled_templates() -> TemplateStore {
    TemplateStore::new(BUNDLED_TEMPLATES_DIR)
}

pub fn read(path: PathBuf) -> String {
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}
