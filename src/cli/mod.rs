//! CLI module for Skue.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_duration, Output};

use clap::{Parser, Subcommand};

/// Skue - Video Transcription, Retrieval, and Q&A
///
/// A local-first CLI tool for downloading videos, transcribing them, and
/// asking questions about their content. The name "Skue" comes from the
/// Norwegian word for "behold" or "watch."
#[derive(Parser, Debug)]
#[command(name = "skue")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Skue and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Download a video without processing it
    Download {
        /// Video URL
        url: String,
    },

    /// Download, transcribe, and index a video end to end
    Process {
        /// Video URL or local video file path
        input: String,

        /// Force re-indexing even if an index already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Manage per-video indexes
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },

    /// Ask a question about an indexed video
    Ask {
        /// Video name (filename stem)
        video: String,

        /// The question to ask
        question: String,

        /// Ollama model to use for the answer
        #[arg(short, long)]
        model: Option<String>,

        /// Number of transcript chunks to use as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Search an indexed video for relevant transcript chunks
    Search {
        /// Video name (filename stem)
        video: String,

        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Search YouTube for videos to process
    Discover {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Summarize a transcribed video
    Summarize {
        /// Video name (filename stem)
        video: String,

        /// Summary style (comprehensive, brief, tldr, key-points)
        #[arg(short, long, default_value = "comprehensive")]
        style: String,

        /// Ollama model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Export a stored transcript
    Export {
        /// Video name (filename stem)
        video: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, srt, vtt)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// List library files and indexed videos
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Build an index from a video's stored transcript
    Build {
        /// Video name (filename stem)
        video: String,

        /// Replace an existing index
        #[arg(short, long)]
        force: bool,
    },

    /// Delete and rebuild a video's index
    Rebuild {
        /// Video name (filename stem)
        video: String,
    },

    /// Delete a video's index
    Delete {
        /// Video name (filename stem)
        video: String,
    },

    /// Build indexes for every stored transcript
    Batch {
        /// Replace existing indexes
        #[arg(short, long)]
        force: bool,
    },

    /// List indexed videos
    List,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
