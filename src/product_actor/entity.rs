use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductName, ProductUpdate};

impl Entity for Product {
    type Key = ProductName;
    type CreateParams = ProductCreate;
    type Patch = ProductUpdate;

    fn key(&self) -> &ProductName {
        &self.name
    }

    fn key_of(params: &ProductCreate) -> &ProductName {
        &params.name
    }

    /// Creates a new Product from creation parameters.
    ///
    /// Both timestamps are set to the commit time.
    fn from_create_params(params: ProductCreate, now: DateTime<Utc>) -> Self {
        Self {
            name: params.name,
            category: params.category,
            quantity: params.quantity,
            price: params.price,
            description: params.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the supplied fields and refreshes `updated_at`.
    ///
    /// # Fields Updated
    /// - `category`, `quantity`, `price`, `description` when present
    /// - `updated_at`: never moves backwards, even if the clock does
    fn on_update(&mut self, patch: ProductUpdate, now: DateTime<Utc>) {
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        self.updated_at = now.max(self.updated_at);
    }
}
