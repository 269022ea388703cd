//! # acessos-client
//!
//! Typed client for the credential-sharing REST API. Every call takes an
//! explicit [`ClientSession`] obtained from [`AcessosClient::login`]; sessions
//! can be kept between runs with a [`SessionStore`].

mod client;
mod error;
mod session;

pub use client::{AcessosClient, RevealedSecret, REVEAL_DISPLAY_SECS};
pub use error::{ClientError, Result};
pub use session::{ClientSession, SessionStore};
