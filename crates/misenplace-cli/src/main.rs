use clap::{Parser, Subcommand};

mod commands;

use commands::Session;

#[derive(Parser)]
#[command(name = "misenplace", version, about = "Mise en Place kitchen task CLI")]
struct Cli {
    /// Staff name to sign in as
    #[arg(long, global = true, env = "MISENPLACE_USER")]
    user: Option<String>,
    /// Password (when sign-in requires one)
    #[arg(long, global = true, env = "MISENPLACE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Validation log
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Staff sign-in helpers
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("misenplace=warn")),
        )
        .init();

    let cli = Cli::parse();
    let session = Session {
        user: cli.user,
        password: cli.password,
    };
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, &session),
        Commands::Log { action } => commands::log::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action, &session),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
