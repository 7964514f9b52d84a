//! HTTP clients for the Eden gateway and content store.
//!
//! [`GatewayClient`] submits creation requests and polls their status;
//! [`ContentStore`] downloads media by content identity using the
//! gateway's locator convention. Both own their `reqwest::Client`
//! explicitly and implement the `eden-monitor` ports.

pub mod content;
pub mod error;
pub mod gateway;
mod wire;

pub use content::ContentStore;
pub use error::ClientError;
pub use gateway::{GatewayClient, GatewayStatusSource};
