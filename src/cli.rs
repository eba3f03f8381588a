//! Command-line interface implementation for dj-beat-drop.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::{DEFAULT_INDEX_URL, DEFAULT_TIMEOUT_SECS};

/// Command-line arguments structure for dj-beat-drop.
#[derive(Parser, Debug)]
#[command(author, version, about = "dj-beat-drop: Django project and app scaffolding tool", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding one template per Django minor version plus `app_template`
    #[arg(long, global = true, env = "DJ_BEAT_DROP_TEMPLATES", value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Package index endpoint returning Django release metadata
    #[arg(long, global = true, env = "DJ_BEAT_DROP_INDEX_URL", default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new Django project
    New(NewArgs),

    /// Create a new Django app inside the current project
    App(AppArgs),

    /// Refresh the bundled templates from the latest and LTS Django releases
    UpdateTemplates,
}

#[derive(ClapArgs, Debug)]
pub struct NewArgs {
    /// Project name (e.g. 'example_project' or 'example-project')
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Use the latest long-term-support release instead of the latest release
    #[arg(long)]
    pub lts: bool,

    /// Overwrite the project directory if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Initialize the project with uv
    #[arg(long, overrides_with = "no_uv")]
    pub uv: bool,

    /// Do not initialize the project with uv
    #[arg(long, overrides_with = "uv")]
    pub no_uv: bool,

    /// Read settings from an .env file with environs
    #[arg(long, overrides_with = "no_env")]
    pub env: bool,

    /// Keep settings as literals
    #[arg(long, overrides_with = "env")]
    pub no_env: bool,
}

impl NewArgs {
    /// Package-manager choice from flags, `None` if it must be asked.
    pub fn uv_choice(&self) -> Option<bool> {
        flag_choice(self.uv, self.no_uv)
    }

    /// Environment-mode choice from flags, `None` if it must be asked.
    pub fn env_choice(&self) -> Option<bool> {
        flag_choice(self.env, self.no_env)
    }
}

fn flag_choice(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

#[derive(ClapArgs, Debug)]
pub struct AppArgs {
    /// App relative path (e.g. 'accounts' or 'apps/accounts')
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Overwrite the app directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingSubcommand
                || e.kind() == ErrorKind::MissingRequiredArgument
                || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
