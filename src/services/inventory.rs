use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{Clock, Commit, CommitObserver, FrameworkError, ResourceActor};
use crate::change_bus::{ChangeBus, ChangeEvent, Subscription};
use crate::clients::ProductClient;
use crate::domain::{Product, ProductCreate, ProductName, ProductUpdate};
use crate::product_actor::{self, ProductError};

/// Turns every committed product mutation into a [`ChangeEvent`] on the bus.
///
/// Installed on the store shards, so it runs inside the shard right after the
/// commit and before the caller gets its reply. That gives:
/// - no event for a rejected mutation;
/// - payload equal to the stored record at that commit;
/// - events for one name in commit order;
/// - a commit the caller already saw acknowledged is published before any
///   mutation that caller issues next.
pub struct ChangePublisher {
    bus: ChangeBus,
}

impl ChangePublisher {
    pub fn new(bus: ChangeBus) -> Self {
        Self { bus }
    }
}

impl CommitObserver<Product> for ChangePublisher {
    fn on_commit(&self, commit: Commit<'_, Product>) {
        let event = match commit {
            Commit::Created(product) => ChangeEvent::created(product.clone()),
            Commit::Updated(product) => ChangeEvent::updated(product.clone()),
            Commit::Deleted(product) => ChangeEvent::deleted(product.name.clone()),
        };
        self.bus.publish(event);
    }
}

/// Entry point for every product request.
///
/// Each call is a single attempt against the store; failures come back
/// unchanged and never produce an event.
#[derive(Clone)]
pub struct InventoryService {
    store: ProductClient,
    bus: ChangeBus,
}

impl InventoryService {
    /// Create the store shards and a fresh bus, joined by a [`ChangePublisher`].
    ///
    /// The returned shards must be spawned (`tokio::spawn(actor.run())`)
    /// before the service is used. Fails if `seed` repeats a name.
    pub fn build(
        shards: usize,
        store_buffer: usize,
        subscriber_buffer: usize,
        clock: Clock,
        seed: Vec<Product>,
    ) -> Result<(Self, Vec<ResourceActor<Product>>), FrameworkError> {
        let bus = ChangeBus::new(subscriber_buffer);
        let publisher: Arc<dyn CommitObserver<Product>> =
            Arc::new(ChangePublisher::new(bus.clone()));
        let (actors, store) = product_actor::new(shards, store_buffer, clock, Some(publisher), seed)?;
        Ok((Self { store, bus }, actors))
    }

    #[instrument(skip(self, params), fields(product_name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        match self.store.create_product(params).await {
            Ok(product) => {
                info!(quantity = product.quantity, price = %product.price, "Product created");
                Ok(product)
            }
            Err(e) => {
                warn!(error = %e, "Product creation rejected");
                Err(e)
            }
        }
    }

    #[instrument(skip(self, name, patch), fields(product_name = %name))]
    pub async fn update_product(
        &self,
        name: ProductName,
        patch: ProductUpdate,
    ) -> Result<Product, ProductError> {
        match self.store.update_product(name, patch).await {
            Ok(product) => {
                info!(quantity = product.quantity, price = %product.price, "Product updated");
                Ok(product)
            }
            Err(e) => {
                warn!(error = %e, "Product update rejected");
                Err(e)
            }
        }
    }

    /// Returns the removed record as confirmation.
    #[instrument(skip(self, name), fields(product_name = %name))]
    pub async fn delete_product(&self, name: ProductName) -> Result<Product, ProductError> {
        match self.store.delete_product(name).await {
            Ok(product) => {
                info!("Product deleted");
                Ok(product)
            }
            Err(e) => {
                warn!(error = %e, "Product deletion rejected");
                Err(e)
            }
        }
    }

    #[instrument(skip(self, name), fields(product_name = %name))]
    pub async fn find_product(&self, name: ProductName) -> Result<Product, ProductError> {
        let result = self.store.find_product(name).await;
        if let Ok(product) = &result {
            debug!(quantity = product.quantity, "Product found");
        }
        result
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        let products = self.store.list_products().await?;
        debug!(product_count = products.len(), "Listed products");
        Ok(products)
    }

    /// Subscribe to changes committed from now on.
    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub(crate) fn store(&self) -> &ProductClient {
        &self.store
    }
}
