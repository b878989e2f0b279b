//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`llm`] - [`ScriptedClient`](llm::ScriptedClient), a mock
//!   [`CompletionClient`](crate::port::CompletionClient) that plays back
//!   scripted responses and records call counts, timing and peak concurrency.
//! - [`usage`] - [`RecordingSink`](usage::RecordingSink), a usage sink that
//!   keeps every record.
//! - [`domain`] - Builders for documents.

pub mod domain;
pub mod llm;
pub mod usage;
