//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "qr-studio")]
#[command(about = "Render styled QR codes to PNG", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a decorated card (gradient, labels, logo) at 2x
    Render {
        /// Text to encode
        content: String,

        #[command(flatten)]
        style: StyleArgs,

        /// Label drawn above the code
        #[arg(long)]
        top_label: Option<String>,

        /// Label drawn below the code
        #[arg(long)]
        bottom_label: Option<String>,

        /// Image placed at the center of the code
        #[arg(long)]
        logo: Option<PathBuf>,

        /// Logo edge length in pixels
        #[arg(long)]
        logo_size: Option<u32>,
    },

    /// Render only the code, full bleed, at 1x
    Preview {
        /// Text to encode
        content: String,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the largest recommended logo size
    LogoSize {
        /// Code width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Error-correction level (L, M, Q, H)
        #[arg(long)]
        level: Option<String>,
    },
}

/// Options shared by the rendering commands.
#[derive(Debug, Clone, Default, Args)]
pub struct StyleArgs {
    /// Code width in pixels, quiet zone included
    #[arg(long)]
    pub width: Option<u32>,

    /// Quiet-zone width in modules
    #[arg(long)]
    pub margin: Option<u32>,

    /// Dark module color (#rrggbb)
    #[arg(long)]
    pub dark: Option<String>,

    /// Light module color (#rrggbb)
    #[arg(long)]
    pub light: Option<String>,

    /// Error-correction level (L, M, Q, H)
    #[arg(long)]
    pub level: Option<String>,

    /// JSON style file
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// TTF/OTF font used for labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Directory the PNG is written to
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
