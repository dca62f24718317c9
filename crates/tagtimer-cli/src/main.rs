use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "tagtimer", version, about = "Countdown timer that records tagged sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Record or skip the finished session
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Recorded sessions
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Daily activity heat-map
    Activity(commands::activity::ActivityArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = tagtimer_core::Config::load_or_default();
    logging::init(&config.log.level);

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Entry { action } => commands::entry::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Activity(args) => commands::activity::run(args, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tagtimer", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
