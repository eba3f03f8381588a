//! Sub-application scaffolding.

use std::path::{Path, PathBuf};

use console::style;
use log::debug;

use crate::constants::APP_TEMPLATE;
use crate::context::TemplateContext;
use crate::error::{Error, Result};
use crate::materializer::{prepare_destination, TemplateStore};
use crate::prompt::Prompter;
use crate::substitutor::substitute;

/// Names derived from an app's relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLocation {
    /// Lowercased relative path, e.g. `apps/accounts`.
    pub relative_path: String,
    /// Last path segment, e.g. `accounts`.
    pub name: String,
    /// Dotted module path, e.g. `apps.accounts`.
    pub namespace: String,
}

impl AppLocation {
    /// Parses an app path such as `accounts` or `Apps/Accounts`.
    ///
    /// # Errors
    /// * `Error::Validation` for absolute paths or empty, `.` or `..` segments
    pub fn parse(app_rel_path: &str) -> Result<Self> {
        let relative_path = app_rel_path.to_lowercase().trim_end_matches('/').to_string();
        let invalid = |reason: &str| {
            Error::Validation(format!("invalid app path '{app_rel_path}': {reason}"))
        };

        if relative_path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if relative_path.starts_with('/') {
            return Err(invalid("path must be relative"));
        }

        let segments: Vec<&str> = relative_path.split('/').collect();
        if segments.iter().any(|segment| matches!(*segment, "" | "." | "..")) {
            return Err(invalid("path segments must be non-empty names"));
        }

        let name = segments.last().map(|segment| segment.to_string()).unwrap_or_default();
        let namespace = segments.join(".");
        Ok(Self { relative_path, name, namespace })
    }
}

/// Creates an app below `base_dir` and returns the context it was rendered with.
pub fn create_app(
    templates: &TemplateStore,
    prompter: &dyn Prompter,
    base_dir: &Path,
    app_rel_path: &str,
    overwrite: bool,
) -> Result<TemplateContext> {
    let location = AppLocation::parse(app_rel_path)?;
    let app_dir: PathBuf = base_dir.join(&location.relative_path);
    debug!("Creating app '{}' in '{}'.", location.namespace, app_dir.display());

    prepare_destination(prompter, &app_dir, overwrite)?;
    templates.materialize(APP_TEMPLATE, &app_dir)?;

    let context = TemplateContext::for_app(&location.namespace, &location.name);
    substitute(&app_dir, &context)?;

    println!(
        "\n{}",
        style(format!("Successfully created app '{}' in {}", location.name, app_dir.display()))
            .green()
    );
    println!(
        "\n{}",
        style("Remember to add your app to INSTALLED_APPS in your project's settings:").yellow()
    );
    println!("\n    INSTALLED_APPS = [");
    println!("        ...,");
    println!("        '{}',", location.namespace);
    println!("    ]");

    Ok(context)
}
