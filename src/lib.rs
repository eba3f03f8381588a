//! dj-beat-drop scaffolds Django projects and apps.
//! It copies a version-pinned template tree, substitutes `{{ name }}`
//! placeholders and optionally wires up uv and environment-based settings.

/// Sub-application scaffolding
pub mod app;

/// Package-manager bootstrap commands
pub mod bootstrap;

/// Command-line interface module for dj-beat-drop
pub mod cli;

/// Runtime configuration from flags and environment
pub mod config;

/// Fixed names and values
pub mod constants;

/// Template context construction
pub mod context;

/// Error types and handling for dj-beat-drop
pub mod error;

/// Logger initialisation
pub mod logger;

/// Template tree copying and renaming
pub mod materializer;

/// Project creation orchestration
pub mod project;

/// User input and interaction handling
pub mod prompt;

/// Release catalog and version resolution
pub mod releases;

/// Settings module rewriting and `.env` generation
pub mod settings;

/// Placeholder substitution
pub mod substitutor;

/// Template refresh from release archives
pub mod updater;
