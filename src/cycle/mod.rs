//! Cycle orchestration layer
//!
//! One cycle checks every configured project: the matching checker fetches
//! the host's current release list, the diff compares it against the store's
//! seen versions, anything new is persisted and then handed to the sink.
//!
//! ```text
//! ┌──────────┐     ┌─────────────┐     ┌──────────┐
//! │ projects │────▶│ CheckerJob  │────▶│   diff   │
//! │ (config) │     │ (fetch)     │     │ (detect) │
//! └──────────┘     └─────────────┘     └────┬─────┘
//!                                           │ new releases
//!                               ┌───────────▼──────────┐
//!                               │ store (persist)      │
//!                               │ then sink (notify)   │
//!                               └──────────────────────┘
//! ```
//!
//! Projects are independent and run concurrently under an in-flight bound;
//! per project the steps always run in the order above.
//!
//! # Modules
//!
//! - [`diff`]: pure new-release detection and notification ordering
//! - [`report`]: per-project outcomes aggregated per cycle
//! - [`retry`]: bounded exponential backoff for transient failures
//! - [`runner`]: the orchestrator driving fetch, diff, persist, notify

pub mod diff;
pub mod report;
pub mod retry;
pub mod runner;
