//! Generated settings rewriting.
//! Switches the settings module to environment-based configuration and tunes
//! the embedded SQLite database on framework versions that support it.

use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::{
    ENV_FILE, SQLITE_FILE, SQLITE_PRAGMAS, SQLITE_TRANSACTION_MODE, SQLITE_TUNING_THRESHOLD,
};
use crate::context::TemplateContext;
use crate::error::{Error, Result};
use crate::releases::FrameworkVersion;

const ENV_IMPORT: &str = "from environs import Env";
const ENV_INIT: [&str; 3] = ["# Initialize environs", "env = Env()", "env.read_env()"];

/// Returns true when the context's framework version gets SQLite tuning.
pub fn sqlite_tuning_enabled(context: &TemplateContext) -> Result<bool> {
    let version = context
        .get("django_version")
        .ok_or_else(|| Error::InvalidVersion(String::new()))?;
    let threshold = FrameworkVersion::parse(SQLITE_TUNING_THRESHOLD)?;
    Ok(FrameworkVersion::parse(version)?.at_least(&threshold))
}

/// SQLite tuning rendered as URL query parameters (`?transaction_mode=...`).
pub fn sqlite_url_options() -> String {
    let init_command = SQLITE_PRAGMAS.concat();
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("transaction_mode", SQLITE_TRANSACTION_MODE)
        .append_pair("init_command", init_command.trim_end_matches(';'))
        .finish();
    format!("?{query}")
}

/// SQLite tuning rendered as an `OPTIONS` entry of a database mapping.
fn sqlite_options_block(indent: &str) -> Vec<String> {
    let mut block = vec![
        format!("{indent}'OPTIONS': {{"),
        format!("{indent}    'transaction_mode': '{SQLITE_TRANSACTION_MODE}',"),
        format!("{indent}    'init_command': ("),
    ];
    block.extend(SQLITE_PRAGMAS.iter().map(|pragma| format!("{indent}        \"{pragma}\"")));
    block.push(format!("{indent}    ),"));
    block.push(format!("{indent}}},"));
    block
}

/// Net bracket nesting change of one line of Python source.
///
/// Brackets inside string literals and trailing comments are ignored.
fn bracket_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in line.chars() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '#' => break,
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => delta += 1,
            ')' | ']' | '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Settings module split into lines with top-level assignment lookup.
#[derive(Debug, Clone)]
pub struct SettingsDocument {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl SettingsDocument {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
            trailing_newline: content.ends_with('\n'),
        }
    }

    /// Returns the line span of the top-level assignment to `name`.
    ///
    /// The span starts at the `NAME =` line and ends on the line that closes
    /// every bracket opened by the assignment.
    pub fn find(&self, name: &str) -> Option<RangeInclusive<usize>> {
        let start = self.lines.iter().position(|line| {
            line.strip_prefix(name)
                .filter(|rest| rest.starts_with([' ', '\t', '=']))
                .map(str::trim_start)
                .is_some_and(|rest| rest.starts_with('=') && !rest.starts_with("=="))
        })?;

        let mut depth = 0;
        for (index, line) in self.lines.iter().enumerate().skip(start) {
            depth += bracket_delta(line);
            if depth <= 0 {
                return Some(start..=index);
            }
        }
        Some(start..=self.lines.len() - 1)
    }

    fn require(&self, name: &str) -> Result<RangeInclusive<usize>> {
        self.find(name).ok_or_else(|| Error::SettingsPatch { setting: name.to_string() })
    }

    /// Replaces the whole assignment to `name` with `replacement`.
    pub fn replace_assignment(&mut self, name: &str, replacement: &str) -> Result<()> {
        let span = self.require(name)?;
        debug!("Replacing settings lines {}-{} ({name}).", span.start() + 1, span.end() + 1);
        self.lines.splice(span, replacement.lines().map(str::to_string));
        Ok(())
    }

    /// Inserts `lines` right after the assignment to `name`.
    pub fn insert_after(&mut self, name: &str, lines: &[&str]) -> Result<()> {
        let end = *self.require(name)?.end();
        self.lines.splice(end + 1..end + 1, lines.iter().map(|line| line.to_string()));
        Ok(())
    }

    /// Prepends `lines` to the document.
    pub fn prepend(&mut self, lines: &[&str]) {
        self.lines.splice(0..0, lines.iter().map(|line| line.to_string()));
    }

    /// Adds the SQLite `OPTIONS` entry to `DATABASES['default']`.
    pub fn tune_sqlite(&mut self) -> Result<()> {
        let span = self.require("DATABASES")?;
        let missing = || Error::SettingsPatch { setting: "DATABASES['default']".to_string() };

        // The default mapping closes on the first line that brings depth from 2 back to 1.
        let mut depth = 0;
        let mut closing = None;
        for index in span.clone() {
            let before = depth;
            depth += bracket_delta(&self.lines[index]);
            if before >= 2 && depth == 1 {
                closing = Some(index);
                break;
            }
        }
        let closing = closing.ok_or_else(missing)?;

        let previous = closing - 1;
        if *span.start() < previous {
            let line = self.lines[previous].trim_end();
            if !line.ends_with(',') && !line.ends_with('{') {
                let terminated = format!("{line},");
                self.lines[previous] = terminated;
            }
        }

        let indent = format!("{}    ", leading_whitespace(&self.lines[closing]));
        self.lines.splice(closing..closing, sqlite_options_block(&indent));
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut content = self.lines.join("\n");
        if self.trailing_newline {
            content.push('\n');
        }
        content
    }
}

/// Rewrites settings content to read configuration from the environment.
///
/// # Errors
/// * `Error::SettingsPatch` if one of the rewritten assignments is missing
pub fn replace_settings_with_environs(content: &str) -> Result<String> {
    let mut document = SettingsDocument::parse(content);

    let mut init = vec!["", ""];
    init.extend(ENV_INIT);
    document.insert_after("BASE_DIR", &init)?;
    document.replace_assignment("SECRET_KEY", r#"SECRET_KEY = env.str("SECRET_KEY")"#)?;
    document.replace_assignment("DEBUG", r#"DEBUG = env.bool("DEBUG")"#)?;
    document.replace_assignment("ALLOWED_HOSTS", r#"ALLOWED_HOSTS = env.list("ALLOWED_HOSTS")"#)?;
    document.replace_assignment(
        "DATABASES",
        r#"DATABASES = {"default": env.dj_db_url("DATABASE_URL")}"#,
    )?;
    document.prepend(&[ENV_IMPORT, ""]);

    Ok(document.render())
}

/// Patches generated settings content.
///
/// In environment mode the settings read their secrets from the environment;
/// otherwise, on versions at or above the tuning threshold, the SQLite
/// configuration gains tuning options. Below the threshold without
/// environment mode the content is returned unchanged.
pub fn patch_settings(content: &str, context: &TemplateContext, use_env: bool) -> Result<String> {
    if use_env {
        return replace_settings_with_environs(content);
    }
    if !sqlite_tuning_enabled(context)? {
        return Ok(content.to_string());
    }

    let mut document = SettingsDocument::parse(content);
    document.tune_sqlite()?;
    Ok(document.render())
}

/// Renders the dotenv file for a project rooted at `project_dir`.
pub fn env_file_content(project_dir: &Path, context: &TemplateContext) -> Result<String> {
    let secret_key = context.get("secret_key").unwrap_or_default();
    let mut database_url = format!("sqlite:///{}", project_dir.join(SQLITE_FILE).display());
    if sqlite_tuning_enabled(context)? {
        database_url.push_str(&sqlite_url_options());
    }

    Ok(format!(
        "DEBUG=True\nSECRET_KEY=\"{secret_key}\"\nALLOWED_HOSTS=\nDATABASE_URL={database_url}\n"
    ))
}

/// Writes the `.env` file next to the generated settings' project root.
pub fn write_env_file(project_dir: &Path, context: &TemplateContext) -> Result<PathBuf> {
    let path = project_dir.join(ENV_FILE);
    debug!("Writing file: {}", path.display());
    fs::write(&path, env_file_content(project_dir, context)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::releases::ResolvedVersion;

    const SETTINGS: &str = r#""""
Django settings for config project.
"""

from pathlib import Path

# Build paths inside the project like this: BASE_DIR / 'subdir'.
BASE_DIR = Path(__file__).resolve().parent.parent

SECRET_KEY = 'abc'

DEBUG = True

ALLOWED_HOSTS = []

DATABASES = {
    'default': {
        'ENGINE': 'django.db.backends.sqlite3',
        'NAME': BASE_DIR / 'db.sqlite3',
    }
}

AUTH_PASSWORD_VALIDATORS = [
    {
        'NAME': 'django.contrib.auth.password_validation.MinimumLengthValidator',
    },
]
"#;

    fn context(version: &str) -> TemplateContext {
        TemplateContext::for_project(&ResolvedVersion::from_full(version), "abc".to_string())
    }

    #[test]
    fn test_bracket_delta_ignores_strings_and_comments() {
        assert_eq!(bracket_delta("DATABASES = {"), 1);
        assert_eq!(bracket_delta("    'NAME': '{not a bracket}',"), 0);
        assert_eq!(bracket_delta("x = 1  # (comment"), 0);
        assert_eq!(bracket_delta("}"), -1);
    }

    #[test]
    fn test_find_spans_multiline_assignment() {
        let document = SettingsDocument::parse(SETTINGS);
        let span = document.find("DATABASES").unwrap();
        assert_eq!(span.end() - span.start(), 5);
        assert!(document.find("DEBUG").is_some_and(|span| span.start() == span.end()));
        assert!(document.find("DEBUG_PROPAGATE_EXCEPTIONS").is_none());
    }

    #[test]
    fn test_replace_settings_with_environs() {
        let result = replace_settings_with_environs(SETTINGS).unwrap();
        assert!(result.starts_with("from environs import Env\n\n"));
        assert!(result.contains("BASE_DIR = Path(__file__).resolve().parent.parent\n\n\n# Initialize environs\nenv = Env()\nenv.read_env()\n"));
        assert!(result.contains(r#"SECRET_KEY = env.str("SECRET_KEY")"#));
        assert!(result.contains(r#"DEBUG = env.bool("DEBUG")"#));
        assert!(result.contains(r#"ALLOWED_HOSTS = env.list("ALLOWED_HOSTS")"#));
        assert!(result.contains(r#"DATABASES = {"default": env.dj_db_url("DATABASE_URL")}"#));
        assert!(!result.contains("'ENGINE': 'django.db.backends.sqlite3'"));
        assert!(!result.contains("SECRET_KEY = 'abc'"));
        assert!(result.contains("AUTH_PASSWORD_VALIDATORS = ["));
    }

    #[test]
    fn test_missing_assignment_is_reported() {
        let content = SETTINGS.replace("ALLOWED_HOSTS = []\n", "");
        match replace_settings_with_environs(&content) {
            Err(Error::SettingsPatch { setting }) => assert_eq!(setting, "ALLOWED_HOSTS"),
            other => panic!("Expected SettingsPatch error, got {other:?}"),
        }
    }

    #[test]
    fn test_tune_sqlite_above_threshold() {
        let result = patch_settings(SETTINGS, &context("5.2.1"), false).unwrap();
        assert!(result.contains("        'NAME': BASE_DIR / 'db.sqlite3',\n        'OPTIONS': {\n"));
        assert!(result.contains("            'transaction_mode': 'IMMEDIATE',"));
        assert!(result.contains("                \"PRAGMA journal_mode = WAL;\""));
        assert!(result.contains("                \"PRAGMA cache_size = 2000;\"\n            ),\n        },\n    }\n}"));
        assert!(result.contains("SECRET_KEY = 'abc'"));
    }

    #[test]
    fn test_below_threshold_is_unchanged() {
        let result = patch_settings(SETTINGS, &context("4.2.20"), false).unwrap();
        assert_eq!(result, SETTINGS);
    }

    #[test]
    fn test_sqlite_url_options() {
        assert_eq!(
            sqlite_url_options(),
            "?transaction_mode=IMMEDIATE\
             &init_command=PRAGMA+journal_mode+%3D+WAL\
             %3BPRAGMA+synchronous+%3D+NORMAL\
             %3BPRAGMA+mmap_size+%3D+134217728\
             %3BPRAGMA+journal_size_limit+%3D+27103364\
             %3BPRAGMA+cache_size+%3D+2000"
        );
    }

    #[test]
    fn test_env_file_content() {
        let below = env_file_content(Path::new("/tmp/demo"), &context("4.2.1")).unwrap();
        assert_eq!(
            below,
            "DEBUG=True\nSECRET_KEY=\"abc\"\nALLOWED_HOSTS=\nDATABASE_URL=sqlite:////tmp/demo/db.sqlite3\n"
        );

        let above = env_file_content(Path::new("/tmp/demo"), &context("5.1")).unwrap();
        assert!(above.contains("DATABASE_URL=sqlite:////tmp/demo/db.sqlite3?transaction_mode=IMMEDIATE&"));
    }
}
