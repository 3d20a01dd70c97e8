//! Terminal UI for the chat session.
//!
//! - [`chat_loop`]: the event loop that turns key presses into session
//!   updates and redraws after each one.
//! - [`renderer`]: draws the chat pane, input line and side panel.
//! - [`markdown`]: styles message text before it is wrapped.
//! - [`state`]: input, scroll and busy state kept beside the session.
//! - [`wrap`]: width-aware wrapping shared by rendering and scroll math.
//! - [`lifecycle`]: raw mode and alternate screen setup/teardown.

pub mod chat_loop;
pub mod lifecycle;
pub mod markdown;
pub mod renderer;
pub mod state;
pub mod wrap;
