//! Docbatch - bounded-concurrency batch completion engine.
//!
//! Takes a batch of documents plus one task, sends each document to an LLM
//! completion API, and returns a per-document result with token usage and
//! cost, while limiting in-flight requests, enforcing rolling request
//! ceilings, and retrying transient upstream failures.
//!
//! # Architecture
//!
//! - **`domain`** - Documents, tasks, results, and the cost model
//!   ([`domain::pricing`])
//! - **`port`** - Completion client and usage sink traits
//! - **`application::batch`** - Rate limiter, retrying executor and
//!   bounded-concurrency scheduler
//! - **`adapter`** - OpenAI and Anthropic clients, and the CLI
//! - **`app`** - Configuration and wiring
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use docbatch::adapter::outbound::llm::openai::OpenAi;
//! use docbatch::application::batch::{BatchEngine, BatchRequest, ExecutorConfig, RateLimitConfig};
//! use docbatch::domain::{Document, TaskCategory};
//! use docbatch::port::NoopSink;
//!
//! # async fn run() -> docbatch::error::Result<()> {
//! let client = Arc::new(OpenAi::from_env("gpt-4o-mini", "https://api.openai.com/v1/")?);
//! let engine = BatchEngine::new(
//!     client,
//!     Arc::new(NoopSink),
//!     ExecutorConfig::default(),
//!     RateLimitConfig::default(),
//! );
//!
//! let documents = vec![Document::new("a", "a.txt", "Quarterly revenue rose 12%.")];
//! let report = engine
//!     .submit(BatchRequest::new(documents, TaskCategory::Summarize))
//!     .await?;
//! println!("{} succeeded, cost ${}", report.summary.successful, report.total_cost);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod application;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
