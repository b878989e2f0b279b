//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the seams between the batch engine and everything it
//! talks to. The engine is written against these traits only; adapters
//! under [`crate::adapter`] implement them for real providers and the
//! `testkit` module implements them for tests.
//!
//! ```text
//!             ┌─────────────────────────┐
//!             │  Scheduler → Executor   │
//!             └──────┬───────────┬──────┘
//!                    │           │
//!                    ▼           ▼
//!           ┌──────────────┐ ┌───────────┐
//!           │ Completion   │ │  Usage    │
//!           │ Client       │ │  Sink     │
//!           └──────────────┘ └───────────┘
//! ```

pub mod outbound;

pub use outbound::completion::{ChatMessage, Completion, CompletionClient, CompletionRequest, Role};
pub use outbound::usage::{ChannelSink, NoopSink, UsageSink};
