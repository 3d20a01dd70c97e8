//! quillchat is a terminal chat assistant for a hosted LLM API.
//!
//! The crate is organized in a few small layers:
//! - [`core`] owns the session transcript, the inference gateway contract
//!   and its HTTP implementation, and configuration loading.
//! - [`ui`] renders the terminal page and runs the interactive loop.
//! - [`api`] defines the chat completion wire payloads.
//! - [`cli`] is the process entry point used by `src/main.rs`.

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
