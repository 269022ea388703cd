//! User accounts and authentication

mod service;
mod types;

pub use service::UserService;
pub use types::*;
