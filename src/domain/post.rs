use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::media::DraftImage;

/// Identity stamped on every post written by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub display_name: String,
    pub user_name: String,
    pub verified: bool,
    pub avatar_url: String,
}

impl Default for AuthorProfile {
    fn default() -> Self {
        Self {
            display_name: "Nissho Code".to_string(),
            user_name: "nissho_code".to_string(),
            verified: true,
            avatar_url: "https://yosshyjungle.sakura.ne.jp/oa_works/smile_man.png".to_string(),
        }
    }
}

/// The post under composition.
#[derive(Debug, Clone, Default)]
pub struct DraftPost {
    pub text: String,
    pub image: Option<DraftImage>,
    pub encoded_image: Option<String>,
}

impl DraftPost {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn is_submittable(&self) -> bool {
        self.has_text() || self.image.is_some()
    }
}

/// Record handed to the post store. The store assigns `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub display_name: String,
    pub user_name: String,
    pub verified: bool,
    pub text: String,
    pub avatar: String,
    pub image: String,
}

impl NewPost {
    pub fn compose(author: &AuthorProfile, text: String, image: Option<String>) -> Self {
        Self {
            display_name: author.display_name.clone(),
            user_name: author.user_name.clone(),
            verified: author.verified,
            text,
            avatar: author.avatar_url.clone(),
            image: image.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPost {
    pub id: String,
    #[serde(flatten)]
    pub post: NewPost,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub id: String,
    pub path: String,
    pub server_timestamp: Option<OffsetDateTime>,
}
