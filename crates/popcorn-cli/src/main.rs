use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{config, details, interactive, search};
use popcorn_config::{Config, PathManager};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "popcorn - search movies and keep a list of what you watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog by title
    Search {
        /// Free-text title query
        query: String,
    },
    /// Show the full record for one catalog id (e.g. tt0111161)
    Details {
        /// Catalog identifier
        id: String,
    },
    /// Interactive session: search, open titles, rate them and keep a watched list
    #[command(long_about = "Start an interactive session. Type a query to search, `open <n>` to see details, `rate <1-10>` and `add` to mark a title as watched. Type `help` inside the session for all commands. The watched list lives only as long as the session.")]
    Interactive {
        /// Initial query (defaults to session.default_query from the config)
        #[arg(long)]
        query: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a config file, prompting for the OMDb API key if not given
    Init {
        /// OMDb API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Overwrite an existing config file without asking
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let mut config = Config::load_or_default(&paths.config_file()).map_err(|e| eyre!("{}", e))?;

    // The interactive screen owns the terminal, so its logs go to a file unless one is configured
    if matches!(cli.command, Commands::Interactive { .. }) && config.logging.file.is_none() {
        config.logging.file = Some(paths.default_log_file());
    }

    logging::init_logging(cli.verbose, cli.quiet, &config.logging).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(query, &config, &output).await,
        Commands::Details { id } => details::run_details(id, &config, &output).await,
        Commands::Interactive { query } => interactive::run_interactive(query, &config, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &paths, config, &output),
    }
}
