use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use gator::config::CONFIG_FILE_NAME;
use gator::{default_commands, Command, Config, Database, Settings, State};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = if Path::new(CONFIG_FILE_NAME).exists() {
        match Config::load(CONFIG_FILE_NAME) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {CONFIG_FILE_NAME}: {e}");
                eprintln!("Using default configuration.");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Initialize logging
    if let Err(e) = gator::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        gator::logging::init_console_only(&config.logging.level);
    }

    let cmd = match Command::from_args(std::env::args().skip(1)) {
        Ok(cmd) => cmd,
        Err(_) => {
            eprintln!("not enough arguments");
            return ExitCode::FAILURE;
        }
    };

    match run(config, cmd).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, cmd: Command) -> gator::Result<()> {
    let settings = Settings::read()?;
    debug!(path = %settings.path().display(), "settings loaded");

    let db = Database::open(&settings.db_url).await?;
    let mut state = State::new(settings, db, config);

    default_commands().run(&mut state, cmd).await
}
