//! CLI module - Command-line interface for LLM Topix
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// LLM Topix - curated AI/LLM news
#[derive(Parser)]
#[command(name = "llm-topix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(alias = "daemon")]
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the latest articles
    #[command(alias = "ls")]
    Latest {
        /// Number of articles to show (defaults to the configured limit)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Print the records as JSON, exactly as the API returns them
        #[arg(long)]
        json: bool,
    },

    /// Check database connectivity
    Check,

    /// Create default config file
    Init,
}

pub use commands::*;
