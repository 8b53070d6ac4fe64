use std::collections::hash_map::{Entry, RandomState};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

// =============================================================================
// 1. THE ABSTRACTION (Keyed entities, lifecycle hooks, commit observers)
// =============================================================================

/// Trait that any domain entity must implement to be managed by [`ResourceActor`].
///
/// Entities are addressed by a natural key carried inside the record itself,
/// so the key used to create a record is the key every later request uses.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Key: Eq + Hash + Ord + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    /// Get the key of the entity
    fn key(&self) -> &Self::Key;

    /// Key the entity built from `params` will be stored under.
    fn key_of(params: &Self::CreateParams) -> &Self::Key;

    /// Construct the full Entity from creation parameters at commit time `now`.
    fn from_create_params(params: Self::CreateParams, now: DateTime<Utc>) -> Self;

    // --- Lifecycle Hooks ---

    /// Apply a partial update at commit time `now`.
    fn on_update(&mut self, patch: Self::Patch, now: DateTime<Utc>);
}

/// Time source used by the shards when stamping records.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// A mutation that has just been applied to a shard's map.
#[derive(Debug, Clone, Copy)]
pub enum Commit<'a, T> {
    Created(&'a T),
    Updated(&'a T),
    Deleted(&'a T),
}

/// Receives every successful mutation, in commit order, from inside the shard.
///
/// The shard calls `on_commit` after the map has changed and before it replies
/// to the caller or touches its next message. Implementations must not block.
pub trait CommitObserver<T: Entity>: Send + Sync + 'static {
    fn on_commit(&self, commit: Commit<'_, T>);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameworkError {
    #[error("Key already exists: {0}")]
    DuplicateKey(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T>,
    },
    Get {
        key: T::Key,
        respond_to: Response<T>,
    },
    Update {
        key: T::Key,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        key: T::Key,
        respond_to: Response<T>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    /// Stop the shard and hand back its final map.
    Shutdown {
        respond_to: Response<Vec<T>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER (one shard of the key space)
// =============================================================================

pub struct ResourceActor<T: Entity> {
    shard: usize,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Key, T>,
    clock: Clock,
    observer: Option<Arc<dyn CommitObserver<T>>>,
}

impl<T: Entity> ResourceActor<T> {
    /// Single-shard actor with no observer.
    pub fn new(buffer_size: usize, clock: Clock) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let actor = Self {
            shard: 0,
            receiver,
            store: HashMap::new(),
            clock,
            observer: None,
        };
        (actor, ResourceClient::new(vec![sender]))
    }

    /// Split the key space across `shards` actors that share one client.
    ///
    /// `seed` records are placed on the shard their key routes to. Two seed
    /// records with the same key fail with [`FrameworkError::DuplicateKey`].
    pub fn sharded(
        shards: usize,
        buffer_size: usize,
        clock: Clock,
        observer: Option<Arc<dyn CommitObserver<T>>>,
        seed: impl IntoIterator<Item = T>,
    ) -> Result<(Vec<Self>, ResourceClient<T>), FrameworkError> {
        let shards = shards.max(1);
        let mut senders = Vec::with_capacity(shards);
        let mut actors = Vec::with_capacity(shards);

        for shard in 0..shards {
            let (sender, receiver) = mpsc::channel(buffer_size.max(1));
            senders.push(sender);
            actors.push(Self {
                shard,
                receiver,
                store: HashMap::new(),
                clock: clock.clone(),
                observer: observer.clone(),
            });
        }

        let client = ResourceClient::new(senders);
        for item in seed {
            let shard = client.shard_for(item.key());
            match actors[shard].store.entry(item.key().clone()) {
                Entry::Occupied(existing) => {
                    return Err(FrameworkError::DuplicateKey(existing.key().to_string()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(item);
                }
            }
        }

        Ok((actors, client))
    }

    #[instrument(name = "resource_actor", skip(self), fields(shard = self.shard))]
    pub async fn run(mut self) {
        debug!(records = self.store.len(), "Shard starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { key, respond_to } => {
                    let _ = respond_to.send(self.handle_get(key));
                }
                ResourceRequest::Update { key, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(key, patch));
                }
                ResourceRequest::Delete { key, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(key));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Shutdown { respond_to } => {
                    // Nothing queued behind this message is processed.
                    self.receiver.close();
                    debug!(records = self.store.len(), "Shard stopped");
                    let final_state: Vec<T> = std::mem::take(&mut self.store).into_values().collect();
                    let _ = respond_to.send(Ok(final_state));
                    return;
                }
            }
        }

        debug!(records = self.store.len(), "Shard stopped, all clients gone");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let key = T::key_of(&params).clone();
        let item = match self.store.entry(key) {
            Entry::Occupied(existing) => {
                debug!(key = %existing.key(), "Create rejected, key taken");
                return Err(FrameworkError::DuplicateKey(existing.key().to_string()));
            }
            Entry::Vacant(slot) => {
                let item = T::from_create_params(params, (self.clock)());
                slot.insert(item).clone()
            }
        };

        info!(key = %item.key(), "Created");
        self.notify(Commit::Created(&item));
        Ok(item)
    }

    fn handle_get(&self, key: T::Key) -> Result<T, FrameworkError> {
        match self.store.get(&key) {
            Some(item) => Ok(item.clone()),
            None => {
                debug!(key = %key, "Lookup missed");
                Err(FrameworkError::NotFound(key.to_string()))
            }
        }
    }

    fn handle_update(&mut self, key: T::Key, patch: T::Patch) -> Result<T, FrameworkError> {
        let now = (self.clock)();
        let item = match self.store.get_mut(&key) {
            Some(item) => {
                item.on_update(patch, now);
                item.clone()
            }
            None => {
                debug!(key = %key, "Update rejected, key missing");
                return Err(FrameworkError::NotFound(key.to_string()));
            }
        };

        info!(key = %key, "Updated");
        self.notify(Commit::Updated(&item));
        Ok(item)
    }

    fn handle_delete(&mut self, key: T::Key) -> Result<T, FrameworkError> {
        let Some(item) = self.store.remove(&key) else {
            debug!(key = %key, "Delete rejected, key missing");
            return Err(FrameworkError::NotFound(key.to_string()));
        };

        info!(key = %key, "Deleted");
        self.notify(Commit::Deleted(&item));
        Ok(item)
    }

    fn notify(&self, commit: Commit<'_, T>) {
        if let Some(observer) = &self.observer {
            observer.on_commit(commit);
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// Handle to a set of shards. Every request for a key goes to the same shard.
#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    senders: Arc<[mpsc::Sender<ResourceRequest<T>>]>,
    hasher: RandomState,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(senders: Vec<mpsc::Sender<ResourceRequest<T>>>) -> Self {
        Self {
            senders: senders.into(),
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.senders.len()
    }

    fn shard_for(&self, key: &T::Key) -> usize {
        (self.hasher.hash_one(key) % self.senders.len() as u64) as usize
    }

    async fn request<R>(
        &self,
        shard: usize,
        make: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.senders[shard]
            .send(make(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T, FrameworkError> {
        let shard = self.shard_for(T::key_of(&params));
        self.request(shard, |respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, key: T::Key) -> Result<T, FrameworkError> {
        let shard = self.shard_for(&key);
        self.request(shard, |respond_to| ResourceRequest::Get { key, respond_to })
            .await
    }

    pub async fn update(&self, key: T::Key, patch: T::Patch) -> Result<T, FrameworkError> {
        let shard = self.shard_for(&key);
        self.request(shard, |respond_to| ResourceRequest::Update { key, patch, respond_to })
            .await
    }

    pub async fn delete(&self, key: T::Key) -> Result<T, FrameworkError> {
        let shard = self.shard_for(&key);
        self.request(shard, |respond_to| ResourceRequest::Delete { key, respond_to })
            .await
    }

    /// Every record on every shard, sorted by key. Not an atomic snapshot.
    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        let mut items = Vec::new();
        for shard in 0..self.senders.len() {
            let part = self
                .request(shard, |respond_to| ResourceRequest::List { respond_to })
                .await?;
            items.extend(part);
        }
        items.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(items)
    }

    /// Stop every shard and return their final records, sorted by key.
    ///
    /// Every mutation acknowledged before a shard stopped is in the result;
    /// requests that reach a stopped shard fail instead of being acknowledged.
    /// All shards are asked to stop even if one of them is already gone.
    pub async fn shutdown(&self) -> Result<Vec<T>, FrameworkError> {
        let mut items = Vec::new();
        let mut failure = None;
        for shard in 0..self.senders.len() {
            match self
                .request(shard, |respond_to| ResourceRequest::Shutdown { respond_to })
                .await
            {
                Ok(part) => items.extend(part),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }
        items.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(items)
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
