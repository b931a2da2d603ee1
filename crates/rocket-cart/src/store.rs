//! The cart store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::cart::{Cart, Product};
use crate::catalog::{CatalogService, LookupError};
use crate::config::{CartConfig, PersistenceMode};
use crate::error::{CartError, CartOperation, LookupTarget};
use crate::ids::ProductId;
use crate::persist::CartPersister;
use rocket_storage::{KeyValueStore, StorageError};

/// Arguments for [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Shopping cart state for one session.
///
/// Holds the current cart, validates quantity changes against the catalog's
/// stock, and keeps storage in step with the cart. Construct one per session
/// and hand out `Arc<CartStore>` to whatever needs it.
///
/// Mutations run one at a time; a second call waits for the first to commit
/// or fail. Reads never wait.
pub struct CartStore<C, S> {
    catalog: C,
    persister: Arc<CartPersister<S>>,
    state: watch::Sender<Cart>,
    writer: Mutex<()>,
    config: CartConfig,
}

impl<C, S> CartStore<C, S>
where
    C: CatalogService,
    S: KeyValueStore,
{
    /// Open the store, seeding the cart from storage.
    ///
    /// A missing key gives an empty cart. A stored value that can't be parsed
    /// is an error and is left as-is in storage.
    pub fn open(catalog: C, storage: S, config: CartConfig) -> Result<Self, CartError> {
        let (persister, cart) = CartPersister::load(storage, config.storage_key.clone())?;
        let (state, _) = watch::channel(cart);

        Ok(Self {
            catalog,
            persister: Arc::new(persister),
            state,
            writer: Mutex::new(()),
            config,
        })
    }

    /// Snapshot of the current cart.
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Subscribe to cart changes. The receiver sees every commit.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Add one unit of a product.
    ///
    /// Increments the quantity if the product is already in the cart;
    /// otherwise fetches its catalog record and appends it with quantity 1.
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _writer = self.writer.lock().await;
        let mut cart = self.cart();

        let requested = cart.amount_of(product_id).saturating_add(1);
        self.check_stock(CartOperation::Add, product_id, requested).await?;

        if !cart.set_amount(product_id, requested) {
            let record = self
                .catalog
                .product(product_id)
                .await
                .and_then(|record| {
                    if record.id == product_id {
                        Ok(record)
                    } else {
                        Err(LookupError::Decode(format!(
                            "catalog returned product {} for {}",
                            record.id, product_id
                        )))
                    }
                })
                .map_err(|source| CartError::Lookup {
                    operation: CartOperation::Add,
                    target: LookupTarget::Catalog,
                    source,
                })?;
            cart.push(Product::from_catalog(record, 1));
        }

        tracing::info!(product_id = %product_id, amount = requested, "added product to cart");
        self.commit(cart);
        Ok(())
    }

    /// Remove a product from the cart entirely.
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _writer = self.writer.lock().await;
        let mut cart = self.cart();

        if cart.remove(product_id).is_none() {
            return Err(CartError::NotInCart {
                operation: CartOperation::Remove,
                product_id,
            });
        }

        tracing::info!(product_id = %product_id, "removed product from cart");
        self.commit(cart);
        Ok(())
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// An `amount` of zero or less does nothing and is not an error.
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        if amount <= 0 {
            tracing::debug!(product_id = %product_id, amount, "ignoring non-positive amount");
            return Ok(());
        }

        let _writer = self.writer.lock().await;
        self.check_stock(CartOperation::Update, product_id, amount).await?;

        let mut cart = self.cart();
        if !cart.set_amount(product_id, amount) {
            return Err(CartError::NotInCart {
                operation: CartOperation::Update,
                product_id,
            });
        }

        tracing::info!(product_id = %product_id, amount, "updated product amount");
        self.commit(cart);
        Ok(())
    }

    /// Write the current cart to storage if it changed since the last write.
    ///
    /// Returns whether a write happened. Useful in deferred mode before the
    /// process exits.
    pub fn flush(&self) -> Result<bool, StorageError> {
        let cart = self.cart();
        self.persister.observe(&cart)
    }

    async fn check_stock(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        requested: i64,
    ) -> Result<(), CartError> {
        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|source| CartError::Lookup {
                operation,
                target: LookupTarget::Stock,
                source,
            })?;

        if stock.id != product_id {
            return Err(CartError::Lookup {
                operation,
                target: LookupTarget::Stock,
                source: LookupError::Decode(format!(
                    "stock service returned product {} for {}",
                    stock.id, product_id
                )),
            });
        }

        if !stock.can_fulfill(requested) {
            return Err(CartError::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        }
        Ok(())
    }

    fn commit(&self, cart: Cart) {
        self.state.send_replace(cart);

        if self.config.persistence == PersistenceMode::Immediate {
            // The commit stands even if the write fails; the next commit retries.
            if let Err(e) = self.flush() {
                tracing::warn!(error = %e, key = self.persister.key(), "failed to persist cart");
            }
        }
    }
}

impl<C, S> CartStore<C, S>
where
    C: CatalogService,
    S: KeyValueStore + 'static,
{
    /// Start the background task that persists the cart after each commit.
    ///
    /// Needed in [`PersistenceMode::Deferred`]; harmless otherwise since
    /// unchanged carts are never rewritten. The task ends when the store is
    /// dropped.
    pub fn spawn_persistence(&self) -> JoinHandle<()> {
        let persister = Arc::clone(&self.persister);
        let mut changes = self.state.subscribe();

        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let cart = changes.borrow_and_update().clone();
                if let Err(e) = persister.observe(&cart) {
                    tracing::warn!(error = %e, key = persister.key(), "failed to persist cart");
                }
            }
            tracing::debug!("cart persistence task stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{shoe, FakeCatalog};
    use rocket_storage::{JsonStoreExt, MemoryStore};
    use std::time::Duration;

    type TestStore = CartStore<Arc<FakeCatalog>, Arc<MemoryStore>>;

    fn open_store(catalog: &Arc<FakeCatalog>, storage: &Arc<MemoryStore>) -> TestStore {
        CartStore::open(
            Arc::clone(catalog),
            Arc::clone(storage),
            CartConfig::default(),
        )
        .unwrap()
    }

    fn stored_cart(storage: &MemoryStore) -> Option<Cart> {
        storage.get_json(crate::CART_STORAGE_KEY).unwrap()
    }

    fn id(n: u64) -> ProductId {
        ProductId::new(n)
    }

    #[tokio::test]
    async fn test_add_distinct_products() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 3).with_product(2, 1).with_product(3, 8));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        for n in [1, 2, 3] {
            store.add_product(id(n)).await.unwrap();
        }

        let cart = store.cart();
        assert_eq!(cart.len(), 3);
        assert!(cart.items().iter().all(|p| p.amount == 1));
        let ids: Vec<u64> = cart.items().iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_add_same_product_twice_increments() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 2));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        store.add_product(id(1)).await.unwrap();
        store.add_product(id(1)).await.unwrap();

        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(id(1)), 2);
        // The catalog record is fetched only for the first add.
        assert_eq!(catalog.product_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_beyond_stock_is_rejected() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 1));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        store.add_product(id(1)).await.unwrap();
        let err = store.add_product(id(1)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::StockExceeded { requested: 2, available: 1, .. }
        ));
        assert_eq!(store.cart().amount_of(id(1)), 1);
    }

    #[tokio::test]
    async fn test_add_out_of_stock_product_never_fetches_catalog() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 0));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        let err = store.add_product(id(1)).await.unwrap_err();
        assert!(matches!(err, CartError::StockExceeded { .. }));
        assert_eq!(catalog.product_calls(), 0);
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_failed_stock_lookup() {
        let catalog = Arc::new(FakeCatalog::new());
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        let err = store.add_product(id(9)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Lookup {
                operation: CartOperation::Add,
                target: LookupTarget::Stock,
                ..
            }
        ));
        assert!(store.cart().is_empty());
        assert!(stored_cart(&storage).is_none());
    }

    #[tokio::test]
    async fn test_add_with_failed_catalog_lookup() {
        let catalog = Arc::new(FakeCatalog::new().with_stock_only(5, 10));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        let err = store.add_product(id(5)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Lookup {
                operation: CartOperation::Add,
                target: LookupTarget::Catalog,
                ..
            }
        ));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_mismatched_catalog_record() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5).with_alias(2, 1));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        let err = store.add_product(id(2)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Lookup {
                target: LookupTarget::Catalog,
                source: LookupError::Decode(_),
                ..
            }
        ));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_mislabelled_stock_is_rejected() {
        let catalog = Arc::new(FakeCatalog::new().with_mislabelled_stock(3, 4));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        let err = store.add_product(id(3)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Lookup {
                operation: CartOperation::Add,
                target: LookupTarget::Stock,
                source: LookupError::Decode(_),
            }
        ));
        assert_eq!(catalog.product_calls(), 0);
        assert!(store.cart().is_empty());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_product() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);
        store.add_product(id(1)).await.unwrap();
        let before = store.cart();

        let err = store.remove_product(id(2)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::NotInCart {
                operation: CartOperation::Remove,
                ..
            }
        ));
        assert_eq!(store.cart(), before);
    }

    #[tokio::test]
    async fn test_remove_makes_no_network_calls() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);
        store.add_product(id(1)).await.unwrap();
        let stock_calls = catalog.stock_calls();

        store.remove_product(id(1)).await.unwrap();
        assert!(store.cart().is_empty());
        assert_eq!(catalog.stock_calls(), stock_calls);
    }

    #[tokio::test]
    async fn test_update_non_positive_amount_is_silent_noop() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);
        store.add_product(id(1)).await.unwrap();
        let stock_calls = catalog.stock_calls();

        for amount in [0, -1, i64::MIN] {
            store
                .update_product_amount(UpdateProductAmount { product_id: id(1), amount })
                .await
                .unwrap();
        }

        assert_eq!(store.cart().amount_of(id(1)), 1);
        assert_eq!(catalog.stock_calls(), stock_calls);
    }

    #[tokio::test]
    async fn test_update_beyond_stock_is_rejected() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 3));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);
        store.add_product(id(1)).await.unwrap();

        let err = store
            .update_product_amount(UpdateProductAmount { product_id: id(1), amount: 4 })
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::StockExceeded { requested: 4, available: 3, .. }));
        assert_eq!(store.cart().amount_of(id(1)), 1);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 3));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        let err = store
            .update_product_amount(UpdateProductAmount { product_id: id(1), amount: 2 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::NotInCart {
                operation: CartOperation::Update,
                ..
            }
        ));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_failed_stock_lookup() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 3));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);
        store.add_product(id(1)).await.unwrap();
        catalog.fail_stock_lookups();

        let err = store
            .update_product_amount(UpdateProductAmount { product_id: id(1), amount: 2 })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::Lookup {
                operation: CartOperation::Update,
                target: LookupTarget::Stock,
                ..
            }
        ));
        assert_eq!(store.cart().amount_of(id(1)), 1);
    }

    #[tokio::test]
    async fn test_full_scenario() {
        let catalog = Arc::new(FakeCatalog::new().with_product(10, 5));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        store.add_product(id(10)).await.unwrap();
        assert_eq!(store.cart().items(), &[shoe(10, 1)]);

        store.add_product(id(10)).await.unwrap();
        assert_eq!(store.cart().items(), &[shoe(10, 2)]);

        store
            .update_product_amount(UpdateProductAmount { product_id: id(10), amount: 5 })
            .await
            .unwrap();
        assert_eq!(store.cart().amount_of(id(10)), 5);

        let err = store
            .update_product_amount(UpdateProductAmount { product_id: id(10), amount: 6 })
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::StockExceeded { .. }));
        assert_eq!(store.cart().amount_of(id(10)), 5);

        store.remove_product(id(10)).await.unwrap();
        assert!(store.cart().is_empty());
        assert_eq!(stored_cart(&storage), Some(Cart::new()));
    }

    #[tokio::test]
    async fn test_commit_persists_immediately() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5).with_product(2, 5));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        store.add_product(id(1)).await.unwrap();
        store.add_product(id(2)).await.unwrap();
        store.add_product(id(1)).await.unwrap();

        assert_eq!(stored_cart(&storage), Some(store.cart()));
    }

    #[tokio::test]
    async fn test_reopen_restores_identical_cart() {
        let catalog = Arc::new(
            FakeCatalog::new()
                .with_product(3, 5)
                .with_product(1, 5)
                .with_product(2, 5),
        );
        let storage = Arc::new(MemoryStore::new());

        let store = open_store(&catalog, &storage);
        for n in [3, 1, 2, 1] {
            store.add_product(id(n)).await.unwrap();
        }
        let original = store.cart();
        drop(store);

        let reopened = open_store(&catalog, &storage);
        assert_eq!(reopened.cart(), original);
    }

    #[tokio::test]
    async fn test_open_with_corrupt_storage_fails_and_keeps_value() {
        let catalog = Arc::new(FakeCatalog::new());
        let storage = Arc::new(MemoryStore::with_entry(crate::CART_STORAGE_KEY, "[{"));

        let result = CartStore::open(Arc::clone(&catalog), Arc::clone(&storage), CartConfig::default());
        assert!(matches!(result, Err(CartError::Storage(_))));
        assert_eq!(
            storage.get(crate::CART_STORAGE_KEY).unwrap().as_deref(),
            Some("[{")
        );
    }

    #[tokio::test]
    async fn test_rejected_operations_do_not_write_storage() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 1));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);

        let _ = store.remove_product(id(1)).await;
        let _ = store
            .update_product_amount(UpdateProductAmount { product_id: id(1), amount: 0 })
            .await;
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_commits() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5));
        let storage = Arc::new(MemoryStore::new());
        let store = open_store(&catalog, &storage);
        let mut changes = store.subscribe();

        store.add_product(id(1)).await.unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().amount_of(id(1)), 1);

        let _ = store.remove_product(id(2)).await;
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_adds_do_not_lose_updates() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 10).with_delay(Duration::from_millis(5)));
        let storage = Arc::new(MemoryStore::new());
        let store = Arc::new(open_store(&catalog, &storage));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add_product(id(1)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.cart().amount_of(id(1)), 4);
    }

    #[tokio::test]
    async fn test_deferred_persistence() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5));
        let storage = Arc::new(MemoryStore::new());
        let config = CartConfig::default().with_persistence(PersistenceMode::Deferred);
        let store = CartStore::open(Arc::clone(&catalog), Arc::clone(&storage), config).unwrap();
        let task = store.spawn_persistence();

        store.add_product(id(1)).await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while stored_cart(&storage).is_none() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("cart was never persisted");
        assert_eq!(stored_cart(&storage), Some(store.cart()));

        drop(store);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_deferred_flush() {
        let catalog = Arc::new(FakeCatalog::new().with_product(1, 5));
        let storage = Arc::new(MemoryStore::new());
        let config = CartConfig::default().with_persistence(PersistenceMode::Deferred);
        let store = CartStore::open(Arc::clone(&catalog), Arc::clone(&storage), config).unwrap();

        store.add_product(id(1)).await.unwrap();
        assert!(stored_cart(&storage).is_none());

        assert!(store.flush().unwrap());
        assert!(!store.flush().unwrap());
        assert_eq!(stored_cart(&storage), Some(store.cart()));
    }
}
