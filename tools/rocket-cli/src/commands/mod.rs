//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod show;

use clap::{Args, Subcommand};
use rocket_cart::ProductId;

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Print the stored JSON document instead of a table.
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product to add one unit of.
    pub id: ProductId,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Product to remove from the cart.
    pub id: ProductId,
}

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Product to update.
    pub id: ProductId,

    /// New quantity. Zero or less leaves the cart unchanged.
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
