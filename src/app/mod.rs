pub mod composer;
pub mod media;
