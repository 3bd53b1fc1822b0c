//! Jira integration: OAuth-aware API client, typed payloads, and board
//! aggregation.

pub mod boards;
pub mod client;
pub mod types;

pub use boards::boards_with_details;
pub use client::JiraClient;
pub use types::{Board, BoardWithDetails};
