//! Command-line argument parsing.

use clap::{Parser, Subcommand};

/// Cached postcode lookups against postcode.tech.
#[derive(Parser, Debug)]
#[command(name = "pcapi")]
#[command(about = "Cached Dutch postcode and house number lookups")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Full address for a postcode and house number
    Lookup { postcode: String, number: String },

    /// Look up the first postcode and house number found in free text
    ///
    /// Examples:
    ///   pcapi parse 6931XE130
    ///   pcapi parse "Kerkstraat, 6931XE 130"
    Parse { text: String },

    /// Street and city only
    Short { postcode: String, number: String },

    /// Last known rate-limit quota
    Quota,
}
