//! Template materialization.
//! Copies a version-pinned template tree into place and strips the
//! template-only file suffix.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::constants::{TEMPLATE_PACKAGE_PLACEHOLDER, TEMPLATE_SUFFIX};
use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// Locates template trees below a templates root directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the source directory for a template identifier.
    ///
    /// # Arguments
    /// * `template_id` - A minor version (`5.2`) or a fixed identifier (`app_template`)
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if the directory does not exist or is empty
    pub fn resolve(&self, template_id: &str) -> Result<PathBuf> {
        let path = self.root.join(template_id);
        if !path.is_dir() || fs::read_dir(&path)?.next().is_none() {
            return Err(Error::TemplateNotFound { template_id: template_id.to_string(), path });
        }
        Ok(path)
    }

    /// Returns the source directory of a project template.
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` unless the template has `manage.py-tpl` and
    ///   the placeholder package
    pub fn resolve_project(&self, minor_version: &str) -> Result<PathBuf> {
        let path = self.resolve(minor_version)?;
        let manage = path.join(format!("manage.py{TEMPLATE_SUFFIX}"));
        if !manage.is_file() || !path.join(TEMPLATE_PACKAGE_PLACEHOLDER).is_dir() {
            return Err(Error::TemplateNotFound { template_id: minor_version.to_string(), path });
        }
        Ok(path)
    }

    /// Copies the template identified by `template_id` to `destination`.
    pub fn materialize<P: AsRef<Path>>(&self, template_id: &str, destination: P) -> Result<()> {
        let source = self.resolve(template_id)?;
        materialize(&source, destination.as_ref())
    }
}

/// Clears `directory` if it exists, asking the user first.
///
/// # Arguments
/// * `skip_confirm_prompt` - Overwrite without asking
///
/// # Errors
/// * `Error::Cancelled` if the user declines; nothing is deleted in that case
pub fn prepare_destination(
    prompter: &dyn Prompter,
    directory: &Path,
    skip_confirm_prompt: bool,
) -> Result<()> {
    if !directory.exists() {
        return Ok(());
    }

    let overwrite = prompter.confirm(
        skip_confirm_prompt,
        format!(
            "The directory '{}' already exists. Do you want to overwrite it?",
            directory.display()
        ),
        true,
    )?;
    if !overwrite {
        return Err(Error::Cancelled { directory: directory.to_path_buf() });
    }

    debug!("Removing existing directory '{}'.", directory.display());
    if directory.is_dir() {
        fs::remove_dir_all(directory)?;
    } else {
        fs::remove_file(directory)?;
    }
    Ok(())
}

/// Copies `source` recursively into `destination` and renames template files.
///
/// `destination` must not exist yet.
pub fn materialize(source: &Path, destination: &Path) -> Result<()> {
    copy_tree(source, destination)?;
    rename_template_files(destination)
}

/// Recursively copies a directory tree, preserving relative structure.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    if destination.exists() {
        return Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("destination '{}' already exists", destination.display()),
        )));
    }

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            debug!("Copying file: {}", target.display());
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Returns the real file name for a template-marked one.
pub fn strip_template_suffix(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(TEMPLATE_SUFFIX).filter(|stripped| !stripped.is_empty())
}

/// Renames every `*-tpl` file below `directory` to drop the suffix.
pub fn rename_template_files(directory: &Path) -> Result<()> {
    let mut marked: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(directory) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.file_name().to_str().and_then(strip_template_suffix).is_some()
        {
            marked.push(entry.into_path());
        }
    }

    for path in marked {
        let Some(new_name) =
            path.file_name().and_then(|name| name.to_str()).and_then(strip_template_suffix)
        else {
            continue;
        };
        let target = path.with_file_name(new_name);
        debug!("Renaming '{}' to '{}'.", path.display(), target.display());
        fs::rename(&path, &target)?;
    }
    Ok(())
}
