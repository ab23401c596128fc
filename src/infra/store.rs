use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::post::{DocumentHandle, NewPost, PersistedPost};
use crate::infra::firestore::FirestoreClient;

/// Write-only access to the posts collection. The store assigns the timestamp.
pub trait PostStore: Send + Sync {
    fn create_post(&self, record: NewPost) -> impl Future<Output = Result<DocumentHandle>> + Send;
}

#[derive(Clone, Default)]
pub struct MemoryPostStore {
    collection: String,
    posts: Arc<RwLock<Vec<PersistedPost>>>,
}

impl MemoryPostStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            posts: Arc::default(),
        }
    }

    pub async fn posts(&self) -> Vec<PersistedPost> {
        self.posts.read().await.clone()
    }
}

impl PostStore for MemoryPostStore {
    async fn create_post(&self, record: NewPost) -> Result<DocumentHandle> {
        let id = Uuid::new_v4().simple().to_string();
        let timestamp = OffsetDateTime::now_utc();

        self.posts.write().await.push(PersistedPost {
            id: id.clone(),
            post: record,
            timestamp,
        });

        Ok(DocumentHandle {
            path: format!("{}/{}", self.collection, id),
            id,
            server_timestamp: Some(timestamp),
        })
    }
}

/// Store selected at startup from configuration.
#[derive(Clone)]
pub enum AnyPostStore {
    Memory(MemoryPostStore),
    Firestore(FirestoreClient),
}

impl PostStore for AnyPostStore {
    async fn create_post(&self, record: NewPost) -> Result<DocumentHandle> {
        match self {
            Self::Memory(store) => store.create_post(record).await,
            Self::Firestore(client) => client.create_post(record).await,
        }
    }
}
