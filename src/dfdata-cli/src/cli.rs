//! CLI argument definitions
//!
//! Every subcommand runs with no flags, taking its paths from the config.
//! Flags override single paths for one run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dfdata")]
#[command(about = "Normalize and analyze item exports", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split the item export into catalog, spec, slot system, and index files
    #[command(visible_alias = "x")]
    Extract {
        /// Item export (default: data.json)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: normalized_data)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split the prop export into collectibles and consumables and merge
    /// them into the catalog
    Props {
        /// Prop export (default: price.json)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: normalized_data)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill missing catalog prices from secondary price exports
    BackfillPrices {
        /// Catalog to update in place
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Price export; repeat for several, later ones win
        #[arg(short, long = "source")]
        sources: Vec<PathBuf>,
    },

    /// Drop locked weapon slots from the slot system file
    BaselineSlots {
        /// Slot system file to rewrite
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print descriptive statistics for the item export
    #[command(visible_alias = "a")]
    Analyze {
        /// Item export (default: data.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print weapon/accessory compatibility and other derived relations
    #[command(visible_alias = "r")]
    Relations {
        /// Item export (default: data.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Download catalog pictures
    Images {
        /// Catalog to read picture URLs from
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Images directory (default: normalized_data/images)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Concurrent downloads
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Compare expected and downloaded pictures per category
    ImageStatus {
        /// Catalog to read picture URLs from
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Images directory (default: normalized_data/images)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}
