pub mod camera;
pub mod firestore;
pub mod store;
