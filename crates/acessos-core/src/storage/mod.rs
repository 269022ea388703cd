//! Storage backends for users and credentials

mod json_file;
mod traits;

pub use json_file::JsonFileStore;
pub use traits::{KeyStore, Store};
