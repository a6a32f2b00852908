use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Replace text in PDF documents without disturbing their look, and
/// merge, reorder or remove pages.
#[derive(Debug, Parser)]
#[command(name = "pdfreplace", about, version)]
pub struct Cli {
    /// Log tier decisions and the pass summary. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find text and replace it in place, matching the original style
    Replace {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Text to search for (case-insensitive)
        #[arg(long = "find", value_name = "TEXT")]
        find: String,

        /// Replacement text; empty erases the matches
        #[arg(long = "replace", value_name = "TEXT", default_value = "")]
        replace: String,

        /// Pages to edit: 'all' or 'range'
        #[arg(long, default_value = "all")]
        scope: String,

        /// First page of the range (1-based, inclusive)
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        from_page: Option<i64>,

        /// Last page of the range (1-based, inclusive)
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        to_page: Option<i64>,

        /// Font family to use instead of the detected one
        /// (serif, sans, mono, cm, or a family name)
        #[arg(long, value_name = "FAMILY")]
        font: Option<String>,

        /// Extra .ttf/.otf font to consider (repeatable)
        #[arg(long = "font-file", value_name = "PATH")]
        font_files: Vec<PathBuf>,

        /// Directory of additional fonts
        #[arg(long, value_name = "DIR")]
        fonts_dir: Option<PathBuf>,

        /// Output path. Default: FILE with a `-replaced` suffix
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Output format of the summary
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Concatenate PDF files in the given order
    Merge {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,
    },

    /// Rearrange the pages of a PDF
    Reorder {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// New page order, every page exactly once (e.g. '3,1,2')
        #[arg(long)]
        order: String,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,
    },

    /// Delete pages from a PDF
    Remove {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pages to delete (e.g. '1,3-5')
        #[arg(long)]
        pages: String,

        /// Output path
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,
    },
}

/// Output format for the replacement summary.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
