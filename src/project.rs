//! New project orchestration.
//! Sequences validation, version resolution, template materialization,
//! substitution, settings patching and the optional package-manager bootstrap.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use console::style;
use log::debug;
use regex::Regex;

use crate::bootstrap::{run_bootstrap, CommandRunner};
use crate::constants::{CONFIG_PACKAGE, SETTINGS_FILE, TEMPLATE_PACKAGE_PLACEHOLDER};
use crate::context::{generate_secret_key, TemplateContext};
use crate::error::{Error, Result};
use crate::materializer::{materialize, prepare_destination, TemplateStore};
use crate::prompt::Prompter;
use crate::releases::{ReleaseIndex, VersionResolver};
use crate::settings::{patch_settings, write_env_file};
use crate::substitutor::substitute;

/// Options for the `create_project` operation.
#[derive(Debug, Clone)]
pub struct NewProjectOptions {
    /// Project name; lowercase letters, hyphens and underscores only.
    pub name: String,
    /// Target the long-term-support release instead of the latest one.
    pub use_lts: bool,
    /// Directory the project is generated in.
    pub destination: PathBuf,
    /// Overwrite an existing destination without asking.
    pub overwrite: bool,
    /// Run the package-manager bootstrap after generation.
    pub init_package_manager: bool,
    /// Read secrets from a generated `.env` file.
    pub init_env: bool,
}

/// Collaborators used by the project flow.
pub struct Scaffolder<'a, I: ReleaseIndex> {
    pub resolver: &'a VersionResolver<I>,
    pub templates: &'a TemplateStore,
    pub prompter: &'a dyn Prompter,
    pub runner: &'a dyn CommandRunner,
}

fn project_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-a-z_]+$").expect("project name pattern is valid"))
}

/// Validates a project name.
///
/// # Errors
/// * `Error::Validation` if the name contains anything besides `[a-z_-]`
pub fn validate_project_name(name: &str) -> Result<()> {
    if project_name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "invalid project name '{name}'. Please use only lowercase letters, hyphens, and underscores"
        )))
    }
}

/// Makes `path` absolute against the current working directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Renames the template's placeholder package to the canonical config package.
fn rename_config_package(project_dir: &Path) -> Result<()> {
    let placeholder = project_dir.join(TEMPLATE_PACKAGE_PLACEHOLDER);
    let target = project_dir.join(CONFIG_PACKAGE);
    debug!("Renaming '{}' to '{}'.", placeholder.display(), target.display());
    fs::rename(placeholder, target)?;
    Ok(())
}

/// Patches the generated settings and writes the `.env` file in environment mode.
fn configure_settings(project_dir: &Path, context: &TemplateContext, init_env: bool) -> Result<()> {
    let settings_path = project_dir.join(SETTINGS_FILE);
    let content = fs::read_to_string(&settings_path)?;
    let patched = patch_settings(&content, context, init_env)?;
    if patched != content {
        debug!("Writing file: {}", settings_path.display());
        fs::write(&settings_path, patched)?;
    }

    if init_env {
        write_env_file(project_dir, context)?;
    }
    Ok(())
}

/// Shell commands that start the development server of a bootstrapped project.
fn next_steps(name: &str) -> [String; 2] {
    [format!("cd {name}"), "uv run manage.py runserver".to_string()]
}

impl<I: ReleaseIndex> Scaffolder<'_, I> {
    /// Creates a new project and returns the context it was rendered with.
    ///
    /// # Errors
    /// * `Error::Validation` before anything touches the file system
    /// * `Error::Cancelled` if the user keeps an existing destination
    /// * `Error::Fetch`, `Error::NoLtsRelease` when the version cannot be resolved
    /// * `Error::TemplateNotFound` if no usable template exists for that version
    /// * `Error::CommandFailed` for the first failing bootstrap command
    pub fn create_project(&self, options: &NewProjectOptions) -> Result<TemplateContext> {
        validate_project_name(&options.name)?;
        let project_dir = absolute_path(&options.destination)?;

        prepare_destination(self.prompter, &project_dir, options.overwrite)?;

        let version = self.resolver.resolve(options.use_lts)?;
        debug!("Using Django {} (docs {}).", version.full, version.minor);
        let context = TemplateContext::for_project(&version, generate_secret_key());

        let source = self.templates.resolve_project(&version.minor)?;
        materialize(&source, &project_dir)?;
        rename_config_package(&project_dir)?;
        substitute(&project_dir, &context)?;
        configure_settings(&project_dir, &context, options.init_env)?;

        if options.init_package_manager {
            run_bootstrap(self.runner, &project_dir, &version.minor, options.init_env)?;
        }

        println!("{}", style("New Django project created.").green());
        if options.init_package_manager {
            println!("\n{}", style("To start Django's run server:").green());
            for line in next_steps(&options.name) {
                println!("{line}");
            }
        }

        Ok(context)
    }
}
