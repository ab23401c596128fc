pub mod media;
pub mod post;
pub mod sidebar;
