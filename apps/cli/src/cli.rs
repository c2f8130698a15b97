//! Argument definitions for the `shopfront` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use shopfront_core::SortOrder;

#[derive(Debug, Parser)]
#[command(
    name = "shopfront",
    version,
    about = "Browse the catalog and manage your cart from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: platform config dir / shopfront.toml).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q to silence).
    /// Overrides RUST_LOG when given.
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List products, optionally filtered and sorted.
    Catalog(CatalogArgs),

    /// Show one product.
    Show {
        /// Product id.
        id: String,
    },

    /// Add one unit of a product to the cart.
    Add {
        /// Product id.
        id: String,

        /// Size variant (omit for products without sizes).
        #[arg(long, short)]
        size: Option<String>,
    },

    /// Set a cart line to an exact quantity (0 removes it).
    Update {
        /// Product id.
        id: String,

        /// New quantity.
        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        /// Size variant (omit for products without sizes).
        #[arg(long, short)]
        size: Option<String>,
    },

    /// Remove a cart line.
    Remove {
        /// Product id.
        id: String,

        /// Size variant (omit for products without sizes).
        #[arg(long, short)]
        size: Option<String>,
    },

    /// Show the cart with prices and totals.
    Cart,

    /// Empty the cart.
    Clear,

    /// Price the cart and hand it to checkout.
    Checkout,

    /// Search the catalog by text.
    Search(SearchArgs),

    /// Print the effective configuration.
    Config {
        /// Write it to the config file.
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Text to match against name and category.
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub sub_category: Option<String>,

    /// Only products sold in this size.
    #[arg(long)]
    pub size: Option<String>,

    /// Hide sold-out products.
    #[arg(long)]
    pub in_stock: bool,

    /// Minimum price in cents.
    #[arg(long, value_name = "CENTS")]
    pub min_price: Option<i64>,

    /// Maximum price in cents.
    #[arg(long, value_name = "CENTS")]
    pub max_price: Option<i64>,

    /// featured, name, name-desc, price, price-desc.
    #[arg(long, default_value = "featured")]
    pub sort: SortOrder,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query text. Empty lists everything.
    #[arg(default_value = "")]
    pub query: String,

    /// Read queries from stdin, one per line, and search once typing settles.
    #[arg(long, short)]
    pub interactive: bool,
}
