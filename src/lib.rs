//! # HubSpot Integration Library
//!
//! A production-ready HubSpot CRM API client with:
//! - Bearer-token authentication (private app or OAuth tokens)
//! - Rate-limit-aware retries: exponential backoff with jitter, `Retry-After`
//!   honoring, and transient-failure classification
//! - Structured error decoding with status-code predicates
//! - Cancellation and deadline support threaded through every attempt
//! - Typed CRM services (contacts)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_hubspot::{ExecutionContext, HubSpotClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HubSpotClient::builder()
//!         .private_app_token("pat-na1-xxxxxxxx")
//!         .build()?;
//!
//!     let ctx = ExecutionContext::new();
//!     match client.contacts().get_by_email(&ctx, "ada@example.com").await {
//!         Ok(contact) => println!("found contact {}", contact.id),
//!         Err(e) if e.is_not_found() => println!("no such contact"),
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod context;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// HTTP client and retry engine
pub mod client;
pub mod resilience;

// API services
pub mod services;

// Re-exports for convenience
pub use auth::AuthMethod;
pub use client::{decode_response, HubSpotClient, HubSpotClientBuilder};
pub use config::{HubSpotConfig, HubSpotConfigBuilder, RetryConfig};
pub use context::{CancelReason, ExecutionContext};
pub use errors::{ApiError, HubSpotError, HubSpotResult};
pub use types::{Contact, Properties, PropertyValue};
