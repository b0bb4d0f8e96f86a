use clap::Parser;
use color_eyre::{Result, eyre::WrapErr};
use std::path::PathBuf;

use overflow::{
    Config, Profile, Session, Storage,
    cli::{self, Cli, Commands},
    logging,
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let mut config = match &cli.config {
        Some(path) => Config::load_from(&overflow::utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Logging is best effort; the session works without it
    if let Err(e) = logging::init_logging(&config.log_level, &config.get_log_dir()) {
        eprintln!("WARNING: logging disabled: {}", e);
    }

    let data_path: PathBuf = config.get_data_file_path();
    let storage = Storage::new(data_path);
    // An unreadable task file stops startup, since the first change would overwrite it
    let (mut session, warnings) = Session::open(storage.clone()).wrap_err_with(|| {
        format!(
            "Could not read {}; fix its permissions or pass --data-file",
            storage.path().display()
        )
    })?;
    if !warnings.is_empty() {
        eprintln!(
            "Skipped {} corrupted line(s) in {}:",
            warnings.len(),
            storage.path().display()
        );
        for warning in &warnings {
            eprintln!("  {}", warning);
        }
    }

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => cli::handle_shell(&mut session)?,
        Commands::Exec { words } => cli::handle_exec(&words, &mut session)?,
    }

    Ok(())
}
