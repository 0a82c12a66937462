//! Upstream API Client (UAC): a JSON client for the remote alliance
//! and character API, with ordered-attempt numeric coercion for upstream
//! payloads that mix integer widths, floats, and RFC-3339 timestamps.
//!
//! # Example
//!
//! ```rust,no_run
//! use alliance_client::AllianceClient;
//!
//! async fn example() -> Result<(), alliance_client::ClientError> {
//!     let client = AllianceClient::new("https://upstream.example")?;
//!     let ids = client.list_alliances().await?;
//!     let detail = client.alliance_detail(ids[0]).await?;
//!     println!("{}", detail.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod coerce;
pub mod error;

pub use client::{AllianceClient, AllianceDetail};
pub use error::ClientError;
