//! # Session Store
//!
//! One shopper's session: cart, catalog snapshot and UI flags, plus the
//! guarded operations views call.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item("p1", None)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  next = cart.clone()                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  next.add_one(&catalog, "p1", "default") ──► Err ──► return, cart as-is │
//! │       │ Ok                                                              │
//! │       ▼                                                                 │
//! │  storage.carts().save(&next) ─────────────► Err ──► return, cart as-is │
//! │       │ Ok                                                              │
//! │       ▼                                                                 │
//! │  self.cart = next                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Catalog Loads (latest request wins)
//! ```text
//!  begin ──► ticket #1 ─────────────── fetch ───────────────► finish(#1) ✗ Stale
//!  begin ──────────► ticket #2 ── fetch ──► finish(#2) ✓ applied
//! ```
//!
//! There is no global instance and no lock: the application root builds one
//! `SessionStore` and hands `&mut` access to whatever drives it.

use shopfront_api::{ApiError, ApiResult, CatalogClient, CatalogSource};
use shopfront_core::validation::{validate_search_query, validate_size};
use shopfront_core::{
    Cart, CartLine, Catalog, CheckoutPolicy, CheckoutSnapshot, CoreError, Money, Product,
    ProductQuery, UiFlags, DEFAULT_SIZE,
};
use shopfront_storage::{Database, DbError};
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Catalog Ticket
// =============================================================================

/// Identifies one catalog request. Only the most recently issued ticket
/// may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CatalogTicket(u64);

impl CatalogTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// The shopping session.
#[derive(Debug)]
pub struct SessionStore<S = CatalogClient> {
    cart: Cart,
    catalog: Catalog,
    flags: UiFlags,
    storage: Database,
    source: S,
    policy: CheckoutPolicy,
    latest_ticket: u64,
}

impl<S: CatalogSource> SessionStore<S> {
    /// Opens a session, rehydrating the cart from storage.
    ///
    /// The catalog starts empty; call [`load_catalog`](Self::load_catalog).
    /// A stored cart that cannot be decoded is logged and replaced by an
    /// empty one. Any other storage failure is returned.
    pub async fn open(storage: Database, source: S, policy: CheckoutPolicy) -> SessionResult<Self> {
        let cart = match storage.carts().load().await {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(),
            Err(err @ DbError::Corrupt { .. }) => {
                warn!(error = %err, "Discarding unreadable stored cart");
                Cart::new()
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            lines = cart.line_count(),
            items = cart.item_count(),
            "Session opened"
        );

        Ok(SessionStore {
            cart,
            catalog: Catalog::default(),
            flags: UiFlags::default(),
            storage,
            source,
            policy,
            latest_ticket: 0,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn flags(&self) -> &UiFlags {
        &self.flags
    }

    pub fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Adds one unit of a product. `None` means the product has no size
    /// variants.
    ///
    /// ## Errors
    /// - `ProductNotFound`, `UnknownSize`, `OutOfStock` (cart unchanged)
    /// - `Storage` when the write fails (cart unchanged)
    ///
    /// ## Returns
    /// The line's new quantity.
    pub async fn add_item(&mut self, product_id: &str, size: Option<&str>) -> SessionResult<u32> {
        let size = size.unwrap_or(DEFAULT_SIZE);
        debug!(product_id = %product_id, size = %size, "add_item");

        validate_size(size)?;

        let mut next = self.cart.clone();
        let quantity = next.add_one(&self.catalog, product_id, size)?;
        self.commit(next).await?;

        info!(product_id = %product_id, size = %size, quantity, "Added to cart");
        Ok(quantity)
    }

    /// Sets a line to an exact quantity; 0 removes it.
    ///
    /// ## Errors
    /// - `InvalidQuantity` for negative input
    /// - `ProductNotFound`, `UnknownSize`, `ExceedsStock` for positive input
    /// - `Storage` when the write fails
    pub async fn update_quantity(
        &mut self,
        product_id: &str,
        size: &str,
        quantity: i64,
    ) -> SessionResult<()> {
        debug!(product_id = %product_id, size = %size, quantity, "update_quantity");

        validate_size(size)?;

        let mut next = self.cart.clone();
        next.update_quantity(&self.catalog, product_id, size, quantity)?;
        if next == self.cart {
            return Ok(());
        }
        self.commit(next).await?;

        info!(product_id = %product_id, size = %size, quantity, "Cart line updated");
        Ok(())
    }

    /// Removes a line. Same as `update_quantity(product_id, size, 0)`.
    pub async fn remove_item(&mut self, product_id: &str, size: &str) -> SessionResult<()> {
        self.update_quantity(product_id, size, 0).await
    }

    /// Empties the cart.
    pub async fn clear_cart(&mut self) -> SessionResult<()> {
        self.commit(Cart::new()).await?;
        info!("Cart cleared");
        Ok(())
    }

    /// Persist first, then swap in memory.
    async fn commit(&mut self, next: Cart) -> SessionResult<()> {
        if let Err(err) = self.storage.carts().save(&next).await {
            error!(error = %err, "Failed to persist cart");
            return Err(err.into());
        }
        self.cart = next;
        Ok(())
    }

    // =========================================================================
    // Derived Reads
    // =========================================================================

    /// Sum of quantities across every line.
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Quantity held for one line.
    pub fn line_quantity(&self, product_id: &str, size: &str) -> u32 {
        self.cart.quantity(product_id, size)
    }

    /// Σ price × quantity against the current catalog.
    ///
    /// Lines whose product is not in the catalog count as zero.
    pub fn total_amount(&self) -> Money {
        let stale = self.cart.missing_lines(&self.catalog);
        if !stale.is_empty() && !self.catalog.is_empty() {
            warn!(
                stale_lines = stale.len(),
                "Cart holds products missing from the catalog; pricing them at zero"
            );
        }
        self.cart.total_amount(&self.catalog)
    }

    /// Lines whose product is missing from the current catalog.
    pub fn stale_lines(&self) -> Vec<CartLine> {
        self.cart.missing_lines(&self.catalog)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetches the catalog and replaces the snapshot.
    ///
    /// ## Returns
    /// Number of products now in the catalog.
    ///
    /// ## Errors
    /// `CatalogFetchFailed`; the previous snapshot is kept and
    /// `flags().error` carries the message.
    pub async fn load_catalog(&mut self) -> SessionResult<usize> {
        let ticket = self.begin_catalog_load();
        let result = self.source.fetch_products().await;
        self.finish_catalog_load(ticket, result)
    }

    /// Starts a catalog request and sets the loading flag.
    ///
    /// Use with [`finish_catalog_load`](Self::finish_catalog_load) when the
    /// fetch runs outside the session.
    pub fn begin_catalog_load(&mut self) -> CatalogTicket {
        self.latest_ticket += 1;
        self.flags.loading = true;
        debug!(ticket = self.latest_ticket, "Catalog load started");
        CatalogTicket(self.latest_ticket)
    }

    /// Applies a fetch result if `ticket` is still the latest request.
    ///
    /// ## Errors
    /// - `Stale` when a newer request was started; nothing changes
    /// - `CatalogFetchFailed` when `result` is an error
    pub fn finish_catalog_load(
        &mut self,
        ticket: CatalogTicket,
        result: ApiResult<Vec<Product>>,
    ) -> SessionResult<usize> {
        if ticket.0 != self.latest_ticket {
            debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Discarding superseded catalog response"
            );
            return Err(SessionError::Stale {
                ticket: ticket.0,
                latest: self.latest_ticket,
            });
        }

        self.flags.loading = false;

        match result {
            Ok(products) => {
                self.catalog = Catalog::from_products(products);
                self.flags.error = None;

                let stale = self.stale_lines();
                if !stale.is_empty() {
                    warn!(
                        stale_lines = stale.len(),
                        "Cart references products no longer listed"
                    );
                }

                info!(products = self.catalog.len(), "Catalog loaded");
                Ok(self.catalog.len())
            }
            Err(err) => {
                error!(error = %err, "Catalog load failed");
                let message = err.to_string();
                self.flags.error = Some(message.clone());
                Err(CoreError::CatalogFetchFailed(message).into())
            }
        }
    }

    /// One product, from the snapshot if present, otherwise from the API.
    pub async fn product(&self, product_id: &str) -> SessionResult<Product> {
        if let Some(product) = self.catalog.get(product_id) {
            return Ok(product.clone());
        }

        match self.source.fetch_product(product_id).await {
            Ok(product) => Ok(product),
            Err(ApiError::NotFound(_)) => Err(CoreError::ProductNotFound(product_id.to_string()).into()),
            Err(err) => Err(err.into()),
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub fn set_search_visible(&mut self, visible: bool) {
        self.flags.search_visible = visible;
    }

    /// Flips the search bar flag and returns the new value.
    pub fn toggle_search(&mut self) -> bool {
        self.flags.search_visible = !self.flags.search_visible;
        self.flags.search_visible
    }

    /// Case-insensitive text search over the snapshot. An empty query
    /// lists everything.
    pub fn search(&self, text: &str) -> SessionResult<Vec<&Product>> {
        let text = validate_search_query(text)?;
        Ok(self.catalog.query(&ProductQuery::text(text)))
    }

    /// Full filter/sort query over the snapshot.
    pub fn query(&self, query: &ProductQuery) -> Vec<&Product> {
        self.catalog.query(query)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Prices the cart and stores the result under `checkoutData`.
    ///
    /// The cart itself is left alone; the checkout flow clears it once the
    /// order is placed.
    pub async fn proceed_to_checkout(&mut self) -> SessionResult<CheckoutSnapshot> {
        let snapshot = CheckoutSnapshot::build(&self.cart, &self.catalog, &self.policy)?;

        let skipped = self.stale_lines();
        if !skipped.is_empty() {
            warn!(skipped = skipped.len(), "Delisted products left out of checkout");
        }

        self.storage.checkouts().save(&snapshot).await?;

        info!(
            checkout_id = %snapshot.id,
            items = snapshot.item_count,
            total = %snapshot.total,
            "Proceeding to checkout"
        );
        Ok(snapshot)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_storage::{DbConfig, CART_KEY};
    use std::sync::Mutex;

    /// In-memory catalog source.
    #[derive(Debug)]
    struct FakeSource {
        products: Mutex<ApiResult<Vec<Product>>>,
    }

    impl FakeSource {
        fn with(products: Vec<Product>) -> Self {
            FakeSource {
                products: Mutex::new(Ok(products)),
            }
        }

        fn empty() -> Self {
            FakeSource::with(Vec::new())
        }

        fn failing() -> Self {
            FakeSource {
                products: Mutex::new(Err(ApiError::Request("connection refused".into()))),
            }
        }

        fn set(&self, result: ApiResult<Vec<Product>>) {
            *self.products.lock().unwrap() = result;
        }
    }

    impl CatalogSource for FakeSource {
        async fn fetch_products(&self) -> ApiResult<Vec<Product>> {
            match &*self.products.lock().unwrap() {
                Ok(products) => Ok(products.clone()),
                Err(err) => Err(ApiError::Request(err.to_string())),
            }
        }

        async fn fetch_product(&self, id: &str) -> ApiResult<Product> {
            let products = self.fetch_products().await?;
            products
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| ApiError::NotFound(id.to_string()))
        }
    }

    fn products() -> Vec<Product> {
        vec![
            Product::new("p1", "Linen Shirt", Money::from_cents(2000), 3),
            Product::new("p2", "Hoodie", Money::from_cents(4500), 2)
                .with_sizes(["M", "L"])
                .with_category("Men", "Winterwear"),
            Product::new("p3", "Cap", Money::from_cents(750), 0),
        ]
    }

    async fn open_with(db: Database, source: FakeSource) -> SessionStore<FakeSource> {
        SessionStore::open(db, source, CheckoutPolicy::default())
            .await
            .unwrap()
    }

    async fn loaded_session() -> SessionStore<FakeSource> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut session = open_with(db, FakeSource::with(products())).await;
        session.load_catalog().await.unwrap();
        session
    }

    fn core_err(err: SessionError) -> CoreError {
        match err {
            SessionError::Core(core) => core,
            other => panic!("expected core error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_three_adds_then_out_of_stock() {
        let mut session = loaded_session().await;

        for expected in 1..=3 {
            assert_eq!(session.add_item("p1", None).await.unwrap(), expected);
        }
        assert_eq!(session.total_amount(), Money::from_cents(6000));
        assert_eq!(session.total_amount().to_string(), "$60.00");

        let err = core_err(session.add_item("p1", None).await.unwrap_err());
        assert!(matches!(err, CoreError::OutOfStock { available: 3, .. }));
        assert_eq!(session.line_quantity("p1", DEFAULT_SIZE), 3);

        session.update_quantity("p1", DEFAULT_SIZE, 0).await.unwrap();
        assert_eq!(session.item_count(), 0);
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product_and_size() {
        let mut session = loaded_session().await;

        let err = core_err(session.add_item("nope", None).await.unwrap_err());
        assert_eq!(err, CoreError::ProductNotFound("nope".into()));

        let err = core_err(session.add_item("p2", None).await.unwrap_err());
        assert!(matches!(err, CoreError::UnknownSize { .. }));

        let err = core_err(session.add_item("p3", None).await.unwrap_err());
        assert!(matches!(err, CoreError::OutOfStock { available: 0, .. }));

        assert_eq!(session.item_count(), 0);
    }

    #[tokio::test]
    async fn test_update_quantity_rules() {
        let mut session = loaded_session().await;

        session.update_quantity("p2", "M", 2).await.unwrap();
        assert_eq!(session.line_quantity("p2", "M"), 2);

        let err = core_err(session.update_quantity("p2", "M", 3).await.unwrap_err());
        assert!(matches!(err, CoreError::ExceedsStock { requested: 3, available: 2, .. }));
        assert_eq!(session.line_quantity("p2", "M"), 2);

        let err = core_err(session.update_quantity("p2", "M", -1).await.unwrap_err());
        assert_eq!(err, CoreError::InvalidQuantity(-1));

        let err = core_err(session.update_quantity("p2", "XL", 1).await.unwrap_err());
        assert!(matches!(err, CoreError::UnknownSize { .. }));

        session.update_quantity("p2", "L", 1).await.unwrap();
        assert_eq!(session.item_count(), 3);
        assert_eq!(session.total_amount(), Money::from_cents(13500));

        session.remove_item("p2", "M").await.unwrap();
        assert_eq!(session.line_quantity("p2", "M"), 0);
        assert_eq!(session.item_count(), 1);
    }

    #[tokio::test]
    async fn test_total_tracks_quantity_changes() {
        let mut session = loaded_session().await;

        session.update_quantity("p1", DEFAULT_SIZE, 1).await.unwrap();
        let before = session.total_amount();

        session.update_quantity("p1", DEFAULT_SIZE, 3).await.unwrap();
        let after = session.total_amount();

        assert_eq!(after - before, Money::from_cents(2000).multiply_quantity(2));
    }

    #[tokio::test]
    async fn test_every_mutation_is_persisted() {
        let mut session = loaded_session().await;
        session.add_item("p1", None).await.unwrap();
        session.update_quantity("p2", "L", 2).await.unwrap();

        let stored = session.storage().kv().get(CART_KEY).await.unwrap().unwrap();
        assert_eq!(stored, r#"{"p1":{"default":1},"p2":{"L":2}}"#);

        session.clear_cart().await.unwrap();
        let stored = session.storage().kv().get(CART_KEY).await.unwrap().unwrap();
        assert_eq!(stored, "{}");
    }

    #[tokio::test]
    async fn test_reopen_restores_identical_cart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let mut session = open_with(db.clone(), FakeSource::with(products())).await;
        session.load_catalog().await.unwrap();
        session.add_item("p1", None).await.unwrap();
        session.add_item("p2", Some("M")).await.unwrap();
        session.add_item("p2", Some("M")).await.unwrap();
        let before = session.cart().clone();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let reopened = open_with(db, FakeSource::empty()).await;
        assert_eq!(reopened.cart(), &before);
        assert_eq!(reopened.item_count(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_stored_cart_starts_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().set(CART_KEY, "not json").await.unwrap();

        let session = open_with(db, FakeSource::empty()).await;
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_cart_untouched() {
        let mut session = loaded_session().await;
        session.add_item("p1", None).await.unwrap();

        session.storage().close().await;

        let err = session.add_item("p1", None).await.unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
        assert_eq!(session.line_quantity("p1", DEFAULT_SIZE), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_sets_error_flag() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut session = open_with(db, FakeSource::failing()).await;

        let err = core_err(session.load_catalog().await.unwrap_err());
        assert!(matches!(err, CoreError::CatalogFetchFailed(_)));
        assert!(session.catalog().is_empty());
        assert!(!session.flags().loading);
        assert!(session.flags().error.is_some());

        session.source().set(Ok(products()));
        assert_eq!(session.load_catalog().await.unwrap(), 3);
        assert!(session.flags().error.is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_catalog() {
        let mut session = loaded_session().await;
        session.source().set(Err(ApiError::Timeout(10)));

        assert!(session.load_catalog().await.is_err());
        assert_eq!(session.catalog().len(), 3);
    }

    #[tokio::test]
    async fn test_latest_catalog_request_wins() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut session = open_with(db, FakeSource::empty()).await;

        let first = session.begin_catalog_load();
        let second = session.begin_catalog_load();
        assert!(session.flags().loading);

        let newer = vec![Product::new("new", "New", Money::from_cents(100), 1)];
        assert_eq!(session.finish_catalog_load(second, Ok(newer)).unwrap(), 1);

        let err = session
            .finish_catalog_load(first, Ok(products()))
            .unwrap_err();
        assert!(matches!(err, SessionError::Stale { ticket: 1, latest: 2 }));
        assert!(session.catalog().contains("new"));
        assert!(!session.catalog().contains("p1"));
        assert!(!session.flags().loading);
    }

    #[tokio::test]
    async fn test_stale_error_does_not_clobber_newer_success() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut session = open_with(db, FakeSource::empty()).await;

        let first = session.begin_catalog_load();
        let second = session.begin_catalog_load();
        session.finish_catalog_load(second, Ok(products())).unwrap();

        let late = session.finish_catalog_load(first, Err(ApiError::Timeout(10)));
        assert!(matches!(late, Err(SessionError::Stale { .. })));
        assert!(session.flags().error.is_none());
        assert_eq!(session.catalog().len(), 3);
    }

    #[tokio::test]
    async fn test_delisted_lines_price_at_zero_and_can_be_removed() {
        let mut session = loaded_session().await;
        session.add_item("p1", None).await.unwrap();
        session.add_item("p2", Some("L")).await.unwrap();

        session.source().set(Ok(vec![products().remove(1)]));
        session.load_catalog().await.unwrap();

        assert_eq!(session.total_amount(), Money::from_cents(4500));
        let stale = session.stale_lines();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].product_id, "p1");

        let err = core_err(session.add_item("p1", None).await.unwrap_err());
        assert_eq!(err, CoreError::ProductNotFound("p1".into()));

        session.remove_item("p1", DEFAULT_SIZE).await.unwrap();
        assert!(session.stale_lines().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_writes_snapshot() {
        let mut session = loaded_session().await;

        let err = core_err(session.proceed_to_checkout().await.unwrap_err());
        assert_eq!(err, CoreError::EmptyCart);

        session.update_quantity("p1", DEFAULT_SIZE, 2).await.unwrap();
        let snapshot = session.proceed_to_checkout().await.unwrap();

        assert_eq!(snapshot.subtotal, Money::from_cents(4000));
        assert_eq!(snapshot.shipping, Money::from_cents(1000));
        assert_eq!(snapshot.total, Money::from_cents(5000));

        let stored = session.storage().checkouts().load().await.unwrap().unwrap();
        assert_eq!(stored, snapshot);
        assert_eq!(session.item_count(), 2);
    }

    #[tokio::test]
    async fn test_search_and_flags() {
        let mut session = loaded_session().await;

        assert!(!session.flags().search_visible);
        assert!(session.toggle_search());
        session.set_search_visible(false);
        assert!(!session.flags().search_visible);

        let hits = session.search("  HOOD ").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p2");

        assert_eq!(session.search("").unwrap().len(), 3);
        assert!(session.search(&"x".repeat(500)).is_err());
    }

    #[tokio::test]
    async fn test_product_lookup_falls_back_to_api() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let session = open_with(db, FakeSource::with(products())).await;

        let product = session.product("p2").await.unwrap();
        assert_eq!(product.name, "Hoodie");

        let err = core_err(session.product("zzz").await.unwrap_err());
        assert_eq!(err, CoreError::ProductNotFound("zzz".into()));
    }
}
