//! CLI frontend for the Idle Chapters narrative engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "ic",
    about = "Idle Chapters: inspect content and play journal sessions",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a content pack
    Check {
        /// Content root directory
        #[arg(short, long, default_value = "content")]
        dir: PathBuf,
    },

    /// List content records of one kind
    List {
        /// Content kind (e.g. places, items, recipes, units)
        kind: String,

        /// Content root directory
        #[arg(short, long, default_value = "content")]
        dir: PathBuf,
    },

    /// Show one content record as JSON
    Show {
        /// Content kind
        kind: String,

        /// Record id
        id: String,

        /// Content root directory
        #[arg(short, long, default_value = "content")]
        dir: PathBuf,
    },

    /// Generate narrative units for a place
    Generate {
        /// Place id
        place: String,

        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of units to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Content root directory
        #[arg(short, long, default_value = "content")]
        dir: PathBuf,
    },

    /// Start a session and write it to a save file
    Begin {
        /// Starting place id
        place: String,

        /// Save file to create
        #[arg(long)]
        save: PathBuf,

        /// RNG seed for the first offer
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Player display name
        #[arg(short, long, default_value = "wanderer")]
        player: String,

        /// Content root directory
        #[arg(short, long, default_value = "content")]
        dir: PathBuf,
    },

    /// Run one engine step against a save file
    Step {
        /// enter, continue or choose
        command: String,

        /// Save file written by `begin`
        #[arg(long)]
        save: PathBuf,

        /// Choice id to take (with `choose`)
        #[arg(long)]
        choice: Option<String>,

        /// Free text naming the choice to take (with `choose`)
        #[arg(long, conflicts_with = "choice")]
        say: Option<String>,

        /// Print the journal page as Markdown instead of the step as JSON
        #[arg(short, long)]
        markdown: bool,

        /// Journal date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Content root directory
        #[arg(short, long, default_value = "content")]
        dir: PathBuf,
    },

    /// Print the journal kept in a save file
    Journal {
        /// Save file written by `begin`
        #[arg(long)]
        save: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { dir } => commands::check::run(&dir),
        Commands::List { kind, dir } => commands::list::run(&dir, &kind),
        Commands::Show { kind, id, dir } => commands::show::run(&dir, &kind, &id),
        Commands::Generate {
            place,
            seed,
            count,
            dir,
        } => commands::generate::run(&dir, &place, seed, count),
        Commands::Begin {
            place,
            save,
            seed,
            player,
            dir,
        } => commands::play::begin(&dir, &save, &place, seed, &player),
        Commands::Step {
            command,
            save,
            choice,
            say,
            markdown,
            date,
            dir,
        } => commands::play::step(
            &dir,
            &save,
            &command,
            commands::play::ChoiceArg::from_flags(choice, say),
            markdown,
            date.as_deref(),
        ),
        Commands::Journal { save } => commands::play::journal(&save),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
