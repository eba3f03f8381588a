//! dj-beat-drop's main application entry point.
//! Handles command-line argument parsing, asks for any choice the flags left
//! open and dispatches to the project, app and template-update flows.

use dj_beat_drop::{
    app::create_app,
    bootstrap::SystemRunner,
    cli::{get_args, AppArgs, Args, Commands, NewArgs},
    config::Config,
    error::{default_error_handler, Result},
    logger::init_logger,
    project::{validate_project_name, NewProjectOptions, Scaffolder},
    prompt::{DialoguerPrompter, Prompter},
    updater::{update_templates, HttpArchiveSource},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_args(&args);
    let prompter = DialoguerPrompter::new();

    match args.command {
        Commands::New(new_args) => run_new(&config, &prompter, new_args),
        Commands::App(app_args) => run_app(&config, &prompter, app_args),
        Commands::UpdateTemplates => {
            let resolver = config.resolver();
            let archives = HttpArchiveSource::new(config.timeout);
            update_templates(&resolver, &archives, &config.template_store())?;
            Ok(())
        }
    }
}

fn run_new(config: &Config, prompter: &dyn Prompter, new_args: NewArgs) -> Result<()> {
    let name = match &new_args.name {
        Some(name) => name.clone(),
        None => prompter.text("Project name".to_string())?,
    };
    // Validate before asking anything else.
    validate_project_name(&name)?;

    let destination = std::env::current_dir()?.join(&name);

    let init_package_manager = match new_args.uv_choice() {
        Some(choice) => choice,
        None => prompter.confirm(false, "Initialize your project with UV?".to_string(), true)?,
    };
    let init_env = match new_args.env_choice() {
        Some(choice) => choice,
        None => prompter.confirm(
            false,
            "Initialize your project with an .env file and environs?".to_string(),
            true,
        )?,
    };

    let resolver = config.resolver();
    let templates = config.template_store();
    let runner = SystemRunner;
    let scaffolder = Scaffolder { resolver: &resolver, templates: &templates, prompter, runner: &runner };

    scaffolder.create_project(&NewProjectOptions {
        name,
        use_lts: new_args.lts,
        destination,
        overwrite: new_args.overwrite,
        init_package_manager,
        init_env,
    })?;
    Ok(())
}

fn run_app(config: &Config, prompter: &dyn Prompter, app_args: AppArgs) -> Result<()> {
    let base_dir = std::env::current_dir()?;
    create_app(&config.template_store(), prompter, &base_dir, &app_args.path, app_args.overwrite)?;
    Ok(())
}
