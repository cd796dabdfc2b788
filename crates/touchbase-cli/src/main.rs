use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "touchbase",
    version,
    about = "Touchbase CLI: keep in touch with the people you care about"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Contact management
    Contact {
        #[command(subcommand)]
        action: commands::contact::ContactAction,
    },
    /// Meeting log
    Meeting {
        #[command(subcommand)]
        action: commands::meeting::MeetingAction,
    },
    /// Show the contact list
    List(commands::list::ListArgs),
    /// Pending reminders
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // Logs go to stderr so stdout stays parseable. Override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("touchbase_cli=warn,touchbase_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Contact { action } => commands::contact::run(action),
        Commands::Meeting { action } => commands::meeting::run(action),
        Commands::List(args) => commands::list::run(args),
        Commands::Remind { action } => commands::remind::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
