//! Command line definitions for `lens`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Inspect pages, mine their palettes and edit them with an assistant.
#[derive(Parser, Debug)]
#[command(name = "lens")]
#[command(version)]
pub struct Cli {
    /// Settings file shared with other Lens surfaces
    #[arg(long, env = "LENS_STORE", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which element of the page a command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct Target {
    /// Page URL, or a path to a local HTML file
    pub page: String,

    /// CSS selector of the element
    #[arg(short, long)]
    pub selector: Option<String>,

    /// Pick the topmost element at viewport coordinates instead of a selector
    #[arg(long, num_args = 2, value_names = ["X", "Y"], conflicts_with = "selector")]
    pub at: Option<Vec<f64>>,

    /// JSON list of `{selector, x, y, width, height}` boxes used for hit testing
    #[arg(long)]
    pub layout: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample an element's styles and assets
    Inspect {
        #[command(flatten)]
        target: Target,

        /// Print the raw element record as JSON
        #[arg(long)]
        json: bool,

        /// Store the record as the current element
        #[arg(long)]
        publish: bool,
    },

    /// Mine the page's color palette
    Palette {
        /// Page URL, or a path to a local HTML file
        page: String,

        /// Maximum number of colors
        #[arg(long, env = "LENS_PALETTE_CAP")]
        cap: Option<usize>,
    },

    /// Apply an assistant response to the page offline
    Edit {
        #[command(flatten)]
        target: Target,

        /// File holding the response text; read from stdin when omitted
        #[arg(short, long)]
        response: Option<PathBuf>,

        /// Write the edited document here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ask the assistant to edit an element and apply its answer
    Ask {
        #[command(flatten)]
        target: Target,

        /// What to change
        prompt: String,

        /// Image files to attach
        #[arg(long = "image")]
        images: Vec<PathBuf>,

        /// Write the edited document here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save an element's SVGs, Lottie animations and images
    Assets {
        #[command(flatten)]
        target: Target,

        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Shared settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Store the Gemini API key
    SetKey {
        key: String,
    },

    /// Turn inspect mode on or off for every surface
    Inspect {
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },

    /// Print the current settings
    Show,
}
