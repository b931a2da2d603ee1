//! Show the persisted cart.

use anyhow::{Context as _, Result};
use rocket_storage::{FileStore, KeyValueStore};

use super::ShowArgs;
use crate::context::Context;

/// Run the show command.
pub async fn run(args: ShowArgs, ctx: &Context) -> Result<()> {
    if args.raw {
        return show_raw(ctx);
    }

    let cart = ctx.open_cart()?;
    ctx.output.header("Cart");
    ctx.output.cart(&cart.cart());
    Ok(())
}

/// Print the stored value as is, without decoding it.
fn show_raw(ctx: &Context) -> Result<()> {
    let path = ctx.storage_path();
    let storage = FileStore::open(&path)
        .with_context(|| format!("Failed to open storage: {}", path.display()))?;

    let key = &ctx.config.cart.storage_key;
    match storage.get(key)? {
        Some(raw) => println!("{}", raw),
        None => ctx.output.warn(&format!("Nothing stored under '{}'", key)),
    }
    Ok(())
}
