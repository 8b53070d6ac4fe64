use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::{load_snapshot, save_snapshot, AppConfig};
use crate::actor_framework::{system_clock, Clock};
use crate::domain::Product;
use crate::services::InventoryService;

/// The running inventory kernel: store shards, change bus, and the service on top.
///
/// Responsible for starting the shards, restoring and persisting the
/// snapshot, and handling shutdown.
pub struct InventorySystem {
    pub service: InventoryService,
    snapshot_path: Option<PathBuf>,
    handles: Vec<JoinHandle<()>>,
}

impl InventorySystem {
    pub async fn start(config: &AppConfig) -> anyhow::Result<Self> {
        Self::start_with_clock(config, system_clock()).await
    }

    #[instrument(name = "inventory_system", skip_all, fields(shards = config.store_shards))]
    pub async fn start_with_clock(config: &AppConfig, clock: Clock) -> anyhow::Result<Self> {
        info!("Starting inventory system");

        let seed = match &config.snapshot_path {
            Some(path) => load_snapshot(path).await?,
            None => Vec::new(),
        };
        let restored = seed.len();

        let (service, actors) = InventoryService::build(
            config.store_shards,
            config.store_buffer,
            config.subscriber_buffer,
            clock,
            seed,
        )
        .context("snapshot contains the same product name twice")?;
        let handles = actors.into_iter().map(|actor| tokio::spawn(actor.run())).collect();

        info!(restored, "Inventory system started");
        Ok(Self {
            service,
            snapshot_path: config.snapshot_path.clone(),
            handles,
        })
    }

    /// Stop the shards, close the bus, then persist what the shards held.
    ///
    /// Every mutation acknowledged before its shard stopped is published and
    /// lands in the snapshot; later requests fail instead of being acknowledged.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!("Shutting down inventory system");

        let drained = self.service.store().shutdown().await;
        self.service.bus().close();
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Shard task failed");
            }
        }

        let products = drained.context("failed to stop store shards")?;
        if let Some(path) = &self.snapshot_path {
            save(path, &products).await?;
        }

        info!("Inventory system shutdown complete");
        Ok(())
    }
}

#[instrument(skip(products), fields(path = %path.display()))]
async fn save(path: &Path, products: &[Product]) -> anyhow::Result<()> {
    match save_snapshot(path, products).await {
        Ok(()) => {
            info!(product_count = products.len(), "Snapshot saved");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Snapshot save failed");
            Err(anyhow::Error::new(e).context("failed to save snapshot"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Price, ProductCreate, ProductName, ProductUpdate};
    use crate::mock_framework::stepping_clock;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::time::Duration;

    fn config_with_snapshot(test: &str) -> AppConfig {
        let dir = std::env::temp_dir().join(format!(
            "inventory-system-{}-{}",
            std::process::id(),
            test
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("inventory.json");
        let _ = std::fs::remove_file(&path);
        AppConfig {
            store_shards: 3,
            snapshot_path: Some(path),
            ..AppConfig::default()
        }
    }

    fn create(name: &str, quantity: u32) -> ProductCreate {
        ProductCreate {
            name: ProductName::new(name).unwrap(),
            category: None,
            quantity,
            price: Price::new(dec!(2.25)).unwrap(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_snapshot_survives_restart() {
        let config = config_with_snapshot("restart");

        let system = InventorySystem::start_with_clock(&config, stepping_clock()).await.unwrap();
        system.service.create_product(create("Bolt", 100)).await.unwrap();
        system.service.create_product(create("Nut", 80)).await.unwrap();
        let patch = ProductUpdate { quantity: Some(75), ..Default::default() };
        system
            .service
            .update_product(ProductName::new("Nut").unwrap(), patch)
            .await
            .unwrap();
        let before = system.service.list_products().await.unwrap();
        system.shutdown().await.unwrap();

        let system = InventorySystem::start_with_clock(&config, stepping_clock()).await.unwrap();
        assert_eq!(system.service.list_products().await.unwrap(), before);
        system.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_creates_acknowledged_during_shutdown_are_kept() {
        let config = AppConfig {
            store_shards: 1,
            subscriber_buffer: 1 << 20,
            ..config_with_snapshot("racing-shutdown")
        };
        let mut acknowledged = Vec::new();

        for round in 0..5 {
            let system = InventorySystem::start_with_clock(&config, stepping_clock()).await.unwrap();
            let mut events = system.service.subscribe();
            let service = system.service.clone();
            let writer = tokio::spawn(async move {
                let mut acked = Vec::new();
                for i in 0.. {
                    match service.create_product(create(&format!("Part {round}-{i}"), 1)).await {
                        Ok(product) => acked.push(product.name),
                        Err(_) => break,
                    }
                }
                acked
            });

            tokio::time::sleep(Duration::from_millis(2)).await;
            system.shutdown().await.unwrap();
            let acked = writer.await.unwrap();

            // Acknowledged creates were published before the bus closed.
            let mut published = 0;
            while events.try_recv().is_ok() {
                published += 1;
            }
            assert_eq!(published, acked.len());
            acknowledged.extend(acked);
        }

        let system = InventorySystem::start_with_clock(&config, stepping_clock()).await.unwrap();
        let stored: HashSet<ProductName> = system
            .service
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        for name in &acknowledged {
            assert!(stored.contains(name), "{name} was acknowledged but not saved");
        }
        assert_eq!(stored.len(), acknowledged.len());
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_ends_subscriptions() {
        let system = InventorySystem::start_with_clock(&AppConfig::default(), stepping_clock())
            .await
            .unwrap();
        let mut events = system.service.subscribe();
        let service = system.service.clone();

        system.shutdown().await.unwrap();

        assert!(events.recv().await.is_none());
        assert!(service.list_products().await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_names_in_snapshot_refuse_start() {
        let config = config_with_snapshot("duplicates");
        let path = config.snapshot_path.clone().unwrap();
        std::fs::write(
            &path,
            r#"[
                {"name":"Pen","quantity":1,"price":1.5,"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"},
                {"name":"Pen","quantity":2,"price":1.5,"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();

        assert!(InventorySystem::start_with_clock(&config, stepping_clock()).await.is_err());
    }
}
