use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductName, ProductUpdate};
use crate::product_actor::ProductError;

/// Client for the Product shards: the product store as seen by callers.
///
/// Generated methods: `find_product`, `delete_product`, `list_products`, `shutdown`.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

crate::impl_basic_client!(ProductClient, Product, ProductName, ProductError, product);

impl ProductClient {
    #[instrument(skip(self, params), fields(product_name = %params.name))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(ProductError::from)
    }

    #[instrument(skip(self, name), fields(product_name = %name))]
    pub async fn update_product(
        &self,
        name: ProductName,
        patch: ProductUpdate,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(name, patch).await.map_err(ProductError::from)
    }

    pub fn shard_count(&self) -> usize {
        self.inner.shard_count()
    }
}
