//! Template refresh from framework source archives.
//! Downloads the release archive for the latest and LTS versions and extracts
//! the official project and app templates into the template store.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use log::debug;

use crate::constants::{APP_TEMPLATE, ARCHIVE_URL_TEMPLATE};
use crate::error::{Error, Result};
use crate::materializer::TemplateStore;
use crate::releases::{ReleaseIndex, ResolvedVersion, VersionResolver};

const PROJECT_TEMPLATE_PATH: &str = "django/conf/project_template";
const APP_TEMPLATE_PATH: &str = "django/conf/app_template";

/// Source of framework release archives.
pub trait ArchiveSource {
    /// Returns the zip archive bytes for `version`.
    fn download(&self, version: &str) -> Result<Vec<u8>>;
}

/// Downloads tagged source archives over HTTPS.
pub struct HttpArchiveSource {
    timeout: Duration,
}

impl HttpArchiveSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn download(&self, version: &str) -> Result<Vec<u8>> {
        let url = ARCHIVE_URL_TEMPLATE.replace("{version}", version);
        let fetch_error = |reason: String| Error::Fetch { url: url.clone(), reason };

        debug!("Downloading '{url}'.");
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("dj-beat-drop/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(|e| fetch_error(e.to_string()))?;
        let response = client.get(&url).send().map_err(|e| fetch_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("status {}", response.status())));
        }
        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Maps an archive entry to its destination below `root`.
///
/// Archive entries look like `django-5.2.1/django/conf/project_template/...`;
/// the leading directory is ignored.
fn template_target(entry: &Path, root: &Path, minor: &str, with_app: bool) -> Option<PathBuf> {
    let inner: PathBuf = entry.components().skip(1).collect();
    if let Ok(rest) = inner.strip_prefix(PROJECT_TEMPLATE_PATH) {
        return Some(root.join(minor).join(rest));
    }
    if with_app {
        if let Ok(rest) = inner.strip_prefix(APP_TEMPLATE_PATH) {
            return Some(root.join(APP_TEMPLATE).join(rest));
        }
    }
    None
}

/// Moves a staged template into the store, replacing the installed one.
fn install(staging: &Path, store: &TemplateStore, template_id: &str) -> Result<()> {
    let target = store.root().join(template_id);
    if target.exists() {
        debug!("Removing existing template '{}'.", target.display());
        fs::remove_dir_all(&target)?;
    }
    fs::rename(staging.join(template_id), &target)?;
    Ok(())
}

/// Extracts the project template (and optionally the app template) of one release.
///
/// Entries are staged next to the store and swapped in once the archive is
/// known to contain a project template; on error the installed templates are
/// left as they were.
pub fn extract_templates(
    archive: &[u8],
    version: &ResolvedVersion,
    store: &TemplateStore,
    with_app: bool,
) -> Result<usize> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| Error::Archive(format!("failed to open archive: {e}")))?;

    fs::create_dir_all(store.root())?;
    let staging = tempfile::Builder::new().prefix(".staging-").tempdir_in(store.root())?;
    let project_root = staging.path().join(&version.minor);

    let mut project_files = 0;
    let mut app_files = 0;
    for index in 0..zip.len() {
        let mut file = zip
            .by_index(index)
            .map_err(|e| Error::Archive(format!("failed to read entry {index}: {e}")))?;
        let Some(entry) = file.enclosed_name() else {
            continue;
        };
        let Some(target) = template_target(&entry, staging.path(), &version.minor, with_app)
        else {
            continue;
        };

        if file.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Extracting: {}", target.display());
        io::copy(&mut file, &mut File::create(&target)?)?;
        if target.starts_with(&project_root) {
            project_files += 1;
        } else {
            app_files += 1;
        }
    }

    if project_files == 0 {
        return Err(Error::Archive(format!(
            "no project template found in the archive for {}",
            version.full
        )));
    }

    install(staging.path(), store, &version.minor)?;
    if app_files > 0 {
        install(staging.path(), store, APP_TEMPLATE)?;
    }
    Ok(project_files + app_files)
}

/// Refreshes the templates of the latest and LTS releases.
///
/// Returns the versions whose templates were written.
pub fn update_templates<I: ReleaseIndex>(
    resolver: &VersionResolver<I>,
    archives: &dyn ArchiveSource,
    store: &TemplateStore,
) -> Result<Vec<ResolvedVersion>> {
    let latest = resolver.latest_version()?;
    let lts = resolver.lts_version()?;

    let mut versions = vec![latest];
    if lts != versions[0] {
        versions.push(lts);
    }

    for (position, version) in versions.iter().enumerate() {
        let archive = archives.download(&version.full)?;
        let count = extract_templates(&archive, version, store, position == 0)?;
        println!(
            "{} Django {} template ({} files) in {}",
            style("Updated").green().bold(),
            version.minor,
            count,
            store.root().join(&version.minor).display()
        );
    }

    Ok(versions)
}
