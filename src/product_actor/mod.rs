//! Product storage: the [`Entity`](crate::actor_framework::Entity) binding for
//! [`Product`] and the factory that starts its shards.

pub mod entity;
pub mod error;

pub use error::*;

use std::sync::Arc;

use crate::actor_framework::{Clock, CommitObserver, FrameworkError, ResourceActor};
use crate::clients::ProductClient;
use crate::domain::Product;

/// Creates the Product shards and the client that routes to them.
pub fn new(
    shards: usize,
    buffer_size: usize,
    clock: Clock,
    observer: Option<Arc<dyn CommitObserver<Product>>>,
    seed: Vec<Product>,
) -> Result<(Vec<ResourceActor<Product>>, ProductClient), FrameworkError> {
    let (actors, generic_client) = ResourceActor::sharded(shards, buffer_size, clock, observer, seed)?;
    Ok((actors, ProductClient::new(generic_client)))
}
