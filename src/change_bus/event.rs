use std::fmt;

use serde::Serialize;

use crate::domain::{Product, ProductName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed mutation, as relayed to subscribers.
///
/// `payload` holds the record as it stood right after the commit; deletions
/// carry only the name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub name: ProductName,
    pub payload: Option<Product>,
}

impl ChangeEvent {
    pub fn created(product: Product) -> Self {
        Self {
            kind: ChangeKind::Created,
            name: product.name.clone(),
            payload: Some(product),
        }
    }

    pub fn updated(product: Product) -> Self {
        Self {
            kind: ChangeKind::Updated,
            name: product.name.clone(),
            payload: Some(product),
        }
    }

    pub fn deleted(name: ProductName) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            name,
            payload: None,
        }
    }
}

/// An event plus the position the bus gave it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub sequence: u64,
    pub event: ChangeEvent,
}
