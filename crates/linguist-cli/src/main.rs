use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "linguist", version, about = "Linguist language game CLI")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Play as of this date (YYYY-MM-DD) instead of today's UTC date
    #[arg(long, global = true, value_name = "DATE")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or reset the saved game
    State {
        #[command(subcommand)]
        action: commands::state::StateAction,
    },
    /// Resolve today's login: streak, freezes, daily goals
    Login,
    /// Streak dashboard
    Streak,
    /// Power-up shop
    Shop {
        #[command(subcommand)]
        action: commands::shop::ShopAction,
    },
    /// Daily goals
    Goals {
        #[command(subcommand)]
        action: commands::goals::GoalsAction,
    },
    /// Achievement list
    Achievements,
    /// Quests and boss battles
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Ask the tutor to review a sentence
    Feedback {
        /// Sentence in the target language
        text: String,
    },
    /// Bonus arena mini-games
    Arena {
        #[command(subcommand)]
        action: commands::arena::ArenaAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let today = cli.today.unwrap_or_else(commands::today);

    let result = match cli.command {
        Commands::State { action } => commands::state::run(action, today),
        Commands::Login => commands::login::run(today),
        Commands::Streak => commands::streak::run(today),
        Commands::Shop { action } => commands::shop::run(action, today),
        Commands::Goals { action } => commands::goals::run(action, today),
        Commands::Achievements => commands::achievements::run(today),
        Commands::Quest { action } => commands::quest::run(action, today),
        Commands::Feedback { text } => commands::feedback::run(&text),
        Commands::Arena { action } => commands::arena::run(action, today),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "linguist", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
