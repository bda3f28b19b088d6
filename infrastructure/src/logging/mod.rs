//! Logging infrastructure: structured invocation auditing.
//!
//! Provides [`JsonlInvocationLogger`], a JSONL file writer that implements
//! the [`InvocationLogger`](gateway_application::InvocationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlInvocationLogger;
