//! Command-line entry point.
//!
//! Parses arguments, initializes logging, loads configuration and hands a
//! fresh chat session to the terminal UI. Configuration problems are
//! reported here, before the terminal is taken over.

use std::error::Error;

use clap::Parser;
use tracing::error;

use crate::core::config::{Config, ConfigurationError};
use crate::core::session::ChatSession;
use crate::logging;
use crate::ui::chat_loop::run_chat;

#[derive(Parser, Debug)]
#[command(name = "quillchat", version)]
#[command(about = "A full-screen terminal chat assistant")]
#[command(
    long_about = "quillchat is a full-screen terminal chat assistant backed by Groq's \
hosted models. Each question is sent on its own together with a fixed system \
instruction; earlier turns stay on screen but are not sent back to the model.\n\n\
Environment Variables:\n\
  GROQ_API_KEY      Your Groq API key (required, may be set in ./.env)\n\
  RUST_LOG          Diagnostic log filter written to stderr (optional)\n\n\
Settings (optional, read from config.toml in the platform config directory):\n\
  model             Model name (default: llama-3.1-8b-instant)\n\
  temperature       Sampling temperature 0.0-2.0 (default: 0.7)\n\
  base_url          API base URL (default: https://api.groq.com/openai/v1)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Ctrl+L            Clear chat history\n\
  Up/Down/PgUp/PgDn Scroll through chat history\n\
  Esc or Ctrl+C     Quit the application"
)]
pub struct Args {}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let _args = Args::parse();
    logging::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => report_configuration_error(&err),
    };

    let model = config.model.clone();
    run_chat(ChatSession::from_config(config), model).await
}

fn report_configuration_error(err: &ConfigurationError) -> ! {
    error!(error = %err, "configuration error");
    eprintln!("❌ {err}");
    if let Some(hint) = err.hint() {
        eprintln!("{hint}");
    }
    std::process::exit(err.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_flags_besides_help_and_version() {
        assert!(Args::try_parse_from(["quillchat"]).is_ok());
        assert!(Args::try_parse_from(["quillchat", "--model", "x"]).is_err());
    }

    #[test]
    fn missing_credential_never_yields_a_session() {
        let result = Config::from_parts(None, Default::default()).map(ChatSession::from_config);
        match result {
            Err(err) => assert!(err.to_string().contains("GROQ_API_KEY")),
            Ok(_) => panic!("a session must not be created without a credential"),
        }
    }
}
