//! Session state and the boundary to the model service.
//!
//! - [`transcript`] and [`message`]: the in-memory conversation.
//! - [`gateway`] and [`http_gateway`]: the upstream call contract and its
//!   reqwest implementation.
//! - [`session`]: ties the two together for one interactive run.
//! - [`config`]: credential and settings loading.

pub mod config;
pub mod gateway;
pub mod http_gateway;
pub mod message;
pub mod session;
pub mod transcript;
