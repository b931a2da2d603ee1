//! Cart mutation commands: add, remove and update.

use anyhow::{Context as _, Result};
use rocket_cart::{PersistenceMode, UpdateProductAmount};

use super::{AddArgs, RemoveArgs, UpdateArgs};
use crate::context::{Cart, Context};

/// Run the add command.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    mutate(ctx, &format!("Adding product {}...", args.id), |cart| async move {
        cart.add_product(args.id).await;
    })
    .await
}

/// Run the remove command.
pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    mutate(ctx, &format!("Removing product {}...", args.id), |cart| async move {
        cart.remove_product(args.id).await;
    })
    .await
}

/// Run the update command.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    if args.amount <= 0 {
        ctx.output
            .debug(&format!("Ignoring non-positive amount {}", args.amount));
    }

    let update = UpdateProductAmount {
        product_id: args.id,
        amount: args.amount,
    };
    mutate(ctx, &format!("Updating product {}...", args.id), |cart| async move {
        cart.update_product_amount(update).await;
    })
    .await
}

/// Open the cart, apply one operation and print the result.
///
/// Failures of the operation itself are reported through the notifier, so
/// only setup and final persistence errors come back as `Err`.
async fn mutate<F, Fut>(ctx: &Context, status: &str, op: F) -> Result<()>
where
    F: FnOnce(Cart) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let cart = ctx.open_cart()?;
    let store = cart.store().clone();

    let persistence = match store.config().persistence {
        PersistenceMode::Deferred => Some(store.spawn_persistence()),
        PersistenceMode::Immediate => None,
    };

    let pb = ctx.output.spinner(status);
    let before = cart.cart();
    op(cart.clone()).await;
    pb.finish_and_clear();

    // The observer may not have run yet; flushing here is idempotent.
    store.flush().context("Failed to save cart")?;
    if let Some(handle) = persistence {
        handle.abort();
    }

    let after = cart.cart();
    if after != before {
        ctx.output.success("Cart updated");
    }
    ctx.output.cart(&after);
    Ok(())
}
