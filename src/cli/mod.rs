//! CLI module - Command-line interface for Ontopo Finder
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

use crate::constants::limits;

/// Ontopo Finder - Belgrade restaurant availability
#[derive(Parser)]
#[command(name = "ontopo-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List bookable time slots for a date
    #[command(alias = "t")]
    Slots {
        /// Date as YYYY-MM-DD (default: today, or tomorrow after the cutoff)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the current restaurant-local date and booking status
    Today,

    /// Search restaurants with free tables
    #[command(alias = "s")]
    Search {
        /// Party size
        #[arg(long, short = 'n')]
        size: u32,
        /// Date as YYYY-MM-DD (default: today, or tomorrow after the cutoff)
        #[arg(long, short)]
        date: Option<String>,
        /// Time as HHMM (default: first available slot)
        #[arg(long, short)]
        time: Option<String>,
        /// Number of result pages to fetch
        #[arg(long, short, default_value_t = limits::DEFAULT_SEARCH_PAGES)]
        pages: u32,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
