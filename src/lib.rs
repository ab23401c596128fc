pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;

use crate::app::composer::Composer;
use crate::app::media::MediaAdapter;
use crate::config::AppConfig;
use crate::infra::camera::MediaDevices;
use crate::infra::firestore::FirestoreClient;
use crate::infra::store::{AnyPostStore, MemoryPostStore};

/// Picks the Firestore store when a project is configured, memory otherwise.
pub fn post_store(config: &AppConfig) -> anyhow::Result<AnyPostStore> {
    match config.firestore_project_id {
        Some(_) => Ok(AnyPostStore::Firestore(FirestoreClient::new(config)?)),
        None => Ok(AnyPostStore::Memory(MemoryPostStore::new(
            config.posts_collection.clone(),
        ))),
    }
}

pub fn composer<D: MediaDevices>(
    config: &AppConfig,
    devices: D,
) -> anyhow::Result<Composer<AnyPostStore, D>> {
    let store = post_store(config)?;
    let media = MediaAdapter::new(devices).with_max_image_bytes(config.max_image_bytes);
    Ok(Composer::new(store, media, config.author.clone()))
}
