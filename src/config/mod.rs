use anyhow::{anyhow, Result};
use std::str::FromStr;

use crate::domain::media::MAX_IMAGE_BYTES;
use crate::domain::post::AuthorProfile;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub author: AuthorProfile,
    pub max_image_bytes: u64,
    pub posts_collection: String,
    pub firestore_project_id: Option<String>,
    pub firestore_api_key: Option<String>,
    pub firestore_endpoint: String,
    pub firestore_database: String,
    pub store_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            author: AuthorProfile::default(),
            max_image_bytes: MAX_IMAGE_BYTES,
            posts_collection: "posts".to_string(),
            firestore_project_id: None,
            firestore_api_key: None,
            firestore_endpoint: "https://firestore.googleapis.com".to_string(),
            firestore_database: "(default)".to_string(),
            store_timeout_seconds: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let posts_collection = env_or("POSTS_COLLECTION", &defaults.posts_collection);
        if posts_collection.is_empty() || posts_collection.contains('/') {
            return Err(anyhow!("invalid POSTS_COLLECTION: {:?}", posts_collection));
        }

        Ok(Self {
            author: AuthorProfile {
                display_name: env_or("AUTHOR_DISPLAY_NAME", &defaults.author.display_name),
                user_name: env_or("AUTHOR_USER_NAME", &defaults.author.user_name),
                verified: env_or_parse("AUTHOR_VERIFIED", "true")?,
                avatar_url: env_or("AUTHOR_AVATAR_URL", &defaults.author.avatar_url),
            },
            max_image_bytes: env_or_parse("MAX_IMAGE_BYTES", &MAX_IMAGE_BYTES.to_string())?,
            posts_collection,
            firestore_project_id: env_opt("FIRESTORE_PROJECT_ID"),
            firestore_api_key: env_opt("FIRESTORE_API_KEY"),
            firestore_endpoint: env_or("FIRESTORE_ENDPOINT", &defaults.firestore_endpoint),
            firestore_database: env_or("FIRESTORE_DATABASE", &defaults.firestore_database),
            store_timeout_seconds: env_or_parse("STORE_TIMEOUT_SECONDS", "10")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
