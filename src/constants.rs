//! Common constants used throughout dj-beat-drop.

/// Name the generated configuration package is renamed to.
pub const CONFIG_PACKAGE: &str = "config";

/// Placeholder directory name shipped inside project templates.
pub const TEMPLATE_PACKAGE_PLACEHOLDER: &str = "project_name";

/// Suffix marking files that must be renamed after copying (`settings.py-tpl`).
pub const TEMPLATE_SUFFIX: &str = "-tpl";

/// Template identifier of the sub-application template.
pub const APP_TEMPLATE: &str = "app_template";

/// Minor version number designating the long-term-support line.
pub const LTS_MINOR_MARKER: &str = "2";

/// Substrings that identify pre-release version strings.
pub const PRE_RELEASE_MARKERS: [&str; 3] = ["a", "b", "rc"];

/// First framework version that ships SQLite tuning in the generated settings.
pub const SQLITE_TUNING_THRESHOLD: &str = "5.1";

/// Package index endpoint for framework release metadata.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi/Django/json";

/// Source archive for a framework release tag.
pub const ARCHIVE_URL_TEMPLATE: &str = "https://github.com/django/django/archive/refs/tags/{version}.zip";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings file path relative to the project root.
pub const SETTINGS_FILE: &str = "config/settings.py";

/// Dotenv file written in environment mode.
pub const ENV_FILE: &str = ".env";

/// Embedded database file name beneath the project root.
pub const SQLITE_FILE: &str = "db.sqlite3";

/// Alphabet for generated secret keys.
pub const SECRET_KEY_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";

/// Length of generated secret keys.
pub const SECRET_KEY_LENGTH: usize = 50;

/// SQLite transaction mode applied above the tuning threshold.
pub const SQLITE_TRANSACTION_MODE: &str = "IMMEDIATE";

/// PRAGMA statements run on every new SQLite connection.
pub const SQLITE_PRAGMAS: [&str; 5] = [
    "PRAGMA journal_mode = WAL;",
    "PRAGMA synchronous = NORMAL;",
    "PRAGMA mmap_size = 134217728;",
    "PRAGMA journal_size_limit = 27103364;",
    "PRAGMA cache_size = 2000;",
];
