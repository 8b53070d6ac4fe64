//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_create`] or [`expect_delete`] to assert behavior.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Clock, Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::services::InventoryService;

type Responder<R> = oneshot::Sender<Result<R, FrameworkError>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// The client routes to a single channel we control, so the test plays the
/// shard: it inspects each request and answers it (success, failure, or by
/// dropping the responder).
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(vec![sender]), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Responder<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Key, Responder<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { key, respond_to }) => Some((key, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Key, T::Patch, Responder<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { key, patch, respond_to }) => Some((key, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Key, Responder<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { key, respond_to }) => Some((key, respond_to)),
        _ => None,
    }
}

/// Clock that advances one second per reading, starting at 2024-01-01T00:00:00Z.
pub fn stepping_clock() -> Clock {
    let base: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let ticks = Arc::new(AtomicI64::new(0));
    Arc::new(move || base + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst)))
}

/// A fully wired service over real shards, driven by [`stepping_clock`].
pub fn spawn_inventory_service(shards: usize, subscriber_buffer: usize) -> InventoryService {
    let (service, actors) =
        InventoryService::build(shards, 8, subscriber_buffer, stepping_clock(), Vec::new())
            .expect("empty seed cannot collide");
    for actor in actors {
        tokio::spawn(actor.run());
    }
    service
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Price, Product, ProductCreate, ProductName};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);

        let create_task = tokio::spawn(async move {
            let params = ProductCreate {
                name: ProductName::new("Desk Lamp").unwrap(),
                category: None,
                quantity: 4,
                price: Price::new(dec!(18.50)).unwrap(),
                description: None,
            };
            client.create(params).await
        });

        let (params, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(params.name.as_str(), "Desk Lamp");
        let stored = Product::from_create_params(params, Utc::now());
        responder.send(Ok(stored.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(stored));
    }

    #[test]
    fn test_stepping_clock_advances() {
        let clock = stepping_clock();
        let first = clock();
        let second = clock();
        assert_eq!(second - first, Duration::seconds(1));
    }
}
