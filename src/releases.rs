//! Framework release resolution.
//! Queries the package index once per resolver and derives the latest and
//! long-term-support versions from the release catalog.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::time::Duration;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::constants::{LTS_MINOR_MARKER, PRE_RELEASE_MARKERS};
use crate::error::{Error, Result};

/// Release catalog as published by the package index.
///
/// `releases` keeps the order the index returned them in.
#[derive(Debug, Clone)]
pub struct ReleaseCatalog {
    pub latest: String,
    pub releases: Vec<String>,
}

/// A full version together with its `major.minor` truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub full: String,
    pub minor: String,
}

impl ResolvedVersion {
    pub fn from_full<S: Into<String>>(full: S) -> Self {
        let full = full.into();
        let minor = full.split('.').take(2).collect::<Vec<_>>().join(".");
        Self { full, minor }
    }
}

/// Numeric `major.minor.patch` triple used for version comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameworkVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FrameworkVersion {
    /// Parses `major.minor` or `major.minor.patch`.
    ///
    /// # Errors
    /// * `Error::InvalidVersion` for pre-releases or anything non-numeric
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(version.to_string());
        let parts = version
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match parts.as_slice() {
            [major, minor] => Ok(Self { major: *major, minor: *minor, patch: 0 }),
            [major, minor, patch] => Ok(Self { major: *major, minor: *minor, patch: *patch }),
            _ => Err(invalid()),
        }
    }

    /// Returns true when `self` is at or above `threshold`.
    pub fn at_least(&self, threshold: &FrameworkVersion) -> bool {
        self.cmp(threshold) != Ordering::Less
    }
}

/// Returns true when the version string carries a pre-release marker.
pub fn is_pre_release(version: &str) -> bool {
    PRE_RELEASE_MARKERS.iter().any(|marker| version.contains(marker))
}

fn minor_component(version: &str) -> Option<&str> {
    version.split('.').nth(1)
}

/// Source of release catalogs.
pub trait ReleaseIndex {
    /// Fetches the full release catalog.
    fn fetch(&self) -> Result<ReleaseCatalog>;
}

impl<T: ReleaseIndex + ?Sized> ReleaseIndex for &T {
    fn fetch(&self) -> Result<ReleaseCatalog> {
        (**self).fetch()
    }
}

#[derive(Deserialize)]
struct IndexInfo {
    version: String,
}

#[derive(Deserialize)]
struct IndexResponse {
    info: IndexInfo,
    releases: IndexMap<String, serde_json::Value>,
}

/// Package index client speaking the PyPI JSON API.
pub struct PypiIndex {
    url: String,
    timeout: Duration,
}

impl PypiIndex {
    pub fn new<S: Into<String>>(url: S, timeout: Duration) -> Self {
        Self { url: url.into(), timeout }
    }
}

impl ReleaseIndex for PypiIndex {
    fn fetch(&self) -> Result<ReleaseCatalog> {
        let fetch_error = |reason: String| Error::Fetch { url: self.url.clone(), reason };

        debug!("Fetching release catalog from '{}'.", self.url);
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("dj-beat-drop/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(|e| fetch_error(e.to_string()))?;

        let response =
            client.get(&self.url).send().map_err(|e| fetch_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("status {}", response.status())));
        }

        let body: IndexResponse = response.json().map_err(|e| fetch_error(e.to_string()))?;
        debug!("Index lists {} releases, latest is {}.", body.releases.len(), body.info.version);

        Ok(ReleaseCatalog {
            latest: body.info.version,
            releases: body.releases.into_keys().collect(),
        })
    }
}

/// Resolves framework versions against one release catalog.
///
/// The catalog is fetched on first use and reused for the resolver's lifetime.
pub struct VersionResolver<I: ReleaseIndex> {
    index: I,
    catalog: OnceCell<ReleaseCatalog>,
}

impl<I: ReleaseIndex> VersionResolver<I> {
    pub fn new(index: I) -> Self {
        Self { index, catalog: OnceCell::new() }
    }

    fn catalog(&self) -> Result<&ReleaseCatalog> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(catalog);
        }
        let fetched = self.index.fetch()?;
        Ok(self.catalog.get_or_init(|| fetched))
    }

    /// Returns the newest listed version.
    pub fn latest_version(&self) -> Result<ResolvedVersion> {
        Ok(ResolvedVersion::from_full(self.catalog()?.latest.as_str()))
    }

    /// Returns the newest final release on the long-term-support line.
    ///
    /// # Errors
    /// * `Error::NoLtsRelease` if the catalog has no final release on that line
    pub fn lts_version(&self) -> Result<ResolvedVersion> {
        let catalog = self.catalog()?;
        if minor_component(&catalog.latest) == Some(LTS_MINOR_MARKER) {
            return Ok(ResolvedVersion::from_full(catalog.latest.as_str()));
        }

        catalog
            .releases
            .iter()
            .rev()
            .filter(|release| !is_pre_release(release))
            .filter(|release| minor_component(release) == Some(LTS_MINOR_MARKER))
            .filter_map(|release| {
                FrameworkVersion::parse(release).ok().map(|parsed| (parsed, release))
            })
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, release)| ResolvedVersion::from_full(release.as_str()))
            .ok_or_else(|| Error::NoLtsRelease { marker: LTS_MINOR_MARKER.to_string() })
    }

    /// Resolves either the LTS or the latest version.
    pub fn resolve(&self, use_lts: bool) -> Result<ResolvedVersion> {
        if use_lts {
            self.lts_version()
        } else {
            self.latest_version()
        }
    }
}
