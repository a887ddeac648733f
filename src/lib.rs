pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod models;
pub mod services;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;

pub fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);
    config.validate()?;

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    match command {
        Commands::Slots { date } => cli::cmd_slots(&config, date),

        Commands::Today => cli::cmd_today(&config),

        Commands::Search {
            size,
            date,
            time,
            pages,
        } => cli::cmd_search(&config, size, date, time, pages).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("Created config.toml with default settings");
            } else {
                println!("config.toml already exists");
            }
            Ok(())
        }
    }
}

fn print_help() {
    println!("Ontopo Finder - Belgrade restaurant availability");
    println!();
    println!("Usage: ontopo-finder <command> [args]");
    println!();
    println!("Commands:");
    println!("  slots [--date D]                 Bookable times for a date");
    println!("  today                            Local date and booking status");
    println!("  search --size N [--date D]       Find restaurants with free tables");
    println!("         [--time HHMM] [--pages P]");
    println!("  init                             Create default config.toml");
    println!();
    println!("Dates are YYYY-MM-DD, times are HHMM in Belgrade local time.");
}
