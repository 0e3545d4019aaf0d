//! # agentweave Core
//!
//! Domain types, traits, and error definitions shared by every agentweave
//! crate. Nothing here talks to the network: the [`Gateway`] trait is the
//! single seam through which pattern runners reach an LLM, and the
//! [`ToolRegistry`] is the single seam through which they reach tools.
//!
//! ## Design Philosophy
//!
//! Every external capability is a trait defined here. Implementations live in
//! their own crates, so runners can be exercised against scripted gateways
//! and in-process tools.

pub mod error;
pub mod gateway;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{DecodeError, Error, GatewayError, Result, ToolError};
pub use gateway::{Completion, CompletionRequest, Gateway, ToolCallRequest, ToolDeclaration, ask};
pub use message::{Content, ContentPart, Conversation, Message, Role};
pub use tool::{FnTool, Observation, Tool, ToolRegistry};
