//! CLI definitions for PageHands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PageHands CLI.
#[derive(Parser)]
#[command(name = "pagehands")]
#[command(about = "Page affordances and form auto-fill over a cross-context message router")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Classify a value (phone, email, name, ...)
    Classify {
        value: String,
    },

    /// Extract title, text, links, images and forms from a page fixture
    Extract {
        /// JSON page fixture
        fixture: PathBuf,
    },

    /// Auto-fill a value into a page fixture's form fields
    Fill {
        fixture: PathBuf,
        value: String,

        /// Print the filled document as HTML
        #[arg(long)]
        html: bool,
    },

    /// Highlight every text leaf containing a term
    Highlight {
        fixture: PathBuf,
        term: String,

        #[arg(long)]
        case_sensitive: bool,
    },

    /// Find and replace text in a page fixture
    Replace {
        fixture: PathBuf,
        find: String,
        replace: String,

        /// Treat FIND as a regular expression
        #[arg(long)]
        regex: bool,

        #[arg(long)]
        whole_word: bool,

        #[arg(long)]
        case_sensitive: bool,
    },

    /// Print page analysis and statistics
    Analyze {
        fixture: PathBuf,
    },

    /// Run every context in-process against a page fixture
    Demo {
        fixture: PathBuf,

        /// Value to auto-fill through the popup
        #[arg(long)]
        fill: Option<String>,

        /// Term to highlight through the page host
        #[arg(long)]
        highlight: Option<String>,

        /// Plain-text resume to parse and fill field by field
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Settings file; kept in memory when omitted
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}
