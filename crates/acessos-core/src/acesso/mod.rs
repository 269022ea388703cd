//! Credentials ("acessos"): storage model, visibility and expiration

mod expiration;
mod service;
mod types;
mod visibility;

pub use expiration::{ExpirationClassifier, ExpirationEvent, ExpirationStatus};
pub use service::AcessoService;
pub use types::*;
pub use visibility::VisibilityPolicy;
