//! # Inventory Tracker
//!
//! The kernel of a product inventory service: a store keyed by product name,
//! a change bus that relays every committed mutation to live subscribers, and
//! the service that ties them together behind a small HTTP gateway.
//!
//! ## Terminology Note
//!
//! - **Shard** (a [`ResourceActor`](actor_framework::ResourceActor)) = **Actor** in traditional terminology
//! - **Client** (e.g. [`ProductClient`](clients::ProductClient)) = **Actor Reference/Handle**
//!
//! ## Ingredients
//!
//! - **Foundation**
//!     - **Domain types** - validated value objects and the record itself → [`ProductName`](domain::ProductName), [`Price`](domain::Price), [`Product`](domain::Product)
//!     - **Generic shards** - one mailbox per shard; a name always routes to the same shard → [`ResourceActor`](actor_framework::ResourceActor)
//! - **Core Patterns**
//!     - **Generated clients** - macro-generated, instrumented request methods → [`ProductClient`](clients::ProductClient)
//!     - **Commit observers** - run inside the shard after a commit, before the reply → [`CommitObserver`](actor_framework::CommitObserver)
//!     - **Change bus** - ordered fan-out with bounded, drop-on-full subscriber queues → [`ChangeBus`](change_bus::ChangeBus)
//! - **System Concerns**
//!     - **System coordinator** - startup, snapshot restore, and shutdown → [`InventorySystem`](app_system::InventorySystem)
//!     - **Configuration** - `INVENTORY_*` environment variables → [`AppConfig`](app_system::AppConfig)
//!     - **Tracing setup** → [`setup_tracing`](app_system::setup_tracing)
//!     - **Gateway** - REST routes and an SSE change feed → [`gateway::router`]
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let system = InventorySystem::start(&AppConfig::from_env()?).await?;
//!
//! let mut changes = system.service.subscribe();
//! system.service.create_product(params).await?;
//! let created = changes.recv().await;
//!
//! system.shutdown().await?;
//! ```
//!
//! ## Expected Tracing Output
//!
//! ```text
//!  INFO inventory_system{shards=8}: Starting inventory system
//!  INFO inventory_system{shards=8}: Inventory system started restored=0
//! DEBUG create_product{product_name=Wireless Mouse}: Sending request
//!  INFO resource_actor{shard=3}: Created key=Wireless Mouse
//!  INFO create_product{product_name=Wireless Mouse}: Product created quantity=50 price=29.99
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod change_bus;
pub mod clients;
pub mod domain;
pub mod gateway;
pub mod product_actor;
pub mod services;

#[cfg(test)]
mod mock_framework;
