//! Template context construction.

use indexmap::IndexMap;
use rand::rngs::OsRng;
use rand::Rng;

use crate::constants::{CONFIG_PACKAGE, SECRET_KEY_CHARS, SECRET_KEY_LENGTH};
use crate::releases::ResolvedVersion;

/// Ordered placeholder name to replacement value mapping.
///
/// Insertion order is the order substitutions are applied in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: IndexMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a project template.
    pub fn for_project(version: &ResolvedVersion, secret_key: String) -> Self {
        let mut context = Self::new();
        context.insert("project_name", CONFIG_PACKAGE);
        context.insert("django_version", version.full.as_str());
        context.insert("docs_version", version.minor.as_str());
        context.insert("secret_key", secret_key);
        context
    }

    /// Context for the application template.
    pub fn for_app(app_namespace: &str, app_name: &str) -> Self {
        let mut context = Self::new();
        context.insert("app_name", app_namespace);
        context.insert("camel_case_app_name", camel_case(app_name));
        context
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

}

/// Returns a 50 character random string usable as a SECRET_KEY setting value.
///
/// Characters are drawn uniformly from a fixed alphabet using the operating
/// system's secure random source.
pub fn generate_secret_key() -> String {
    let chars: Vec<char> = SECRET_KEY_CHARS.chars().collect();
    let mut rng = OsRng;
    (0..SECRET_KEY_LENGTH).map(|_| chars[rng.gen_range(0..chars.len())]).collect()
}

/// Converts `snake_case` or `kebab-case` to `CamelCase`.
///
/// Each segment gets an uppercase first letter and a lowercase rest, so
/// digits never start a new word (`v2api` becomes `V2api`).
pub fn camel_case(text: &str) -> String {
    text.split(['-', '_'])
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}
