//! querygate - keyword routing of natural-language queries to data backends
//!
//! A query is classified as vehicle or tax related by a deterministic
//! keyword score, then answered by the matching backend gateway, which
//! talks to an external MCP server over stdio. Every answer, including
//! backend failures, comes back as a uniform [`dispatch::QueryResult`].

pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod routing;
