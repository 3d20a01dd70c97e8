//! The interactive loop: read a key, update state, redraw.
//!
//! A submission is processed to completion before the next key is read.
//! While the reply is pending the screen keeps redrawing so the busy
//! indicator animates, and keys pressed in the meantime are discarded.

use std::error::Error;
use std::io;
use std::time::Duration;

use ratatui::backend::Backend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use tracing::{debug, info};

use crate::core::gateway::InferenceGateway;
use crate::core::session::ChatSession;
use crate::ui::lifecycle::{restore_terminal, setup_terminal};
use crate::ui::renderer::{self, Screen};
use crate::ui::state::UiState;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);
const PAGE_ROWS: u16 = 10;

/// What a key press asks the loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Submit(String),
    Clear,
    Quit,
}

/// Applies a key press to the UI state. Session changes are returned to the
/// caller instead of applied here.
pub fn handle_key(state: &mut UiState, key: KeyEvent) -> KeyOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyOutcome::Quit,
        KeyCode::Char('c') if ctrl => KeyOutcome::Quit,
        KeyCode::Char('l') if ctrl => KeyOutcome::Clear,
        KeyCode::Enter => match state.take_input() {
            Some(text) => KeyOutcome::Submit(text),
            None => KeyOutcome::Continue,
        },
        KeyCode::Backspace => {
            state.backspace();
            KeyOutcome::Continue
        }
        KeyCode::Up => {
            state.scroll_up(1);
            KeyOutcome::Continue
        }
        KeyCode::Down => {
            state.scroll_down(1);
            KeyOutcome::Continue
        }
        KeyCode::PageUp => {
            state.scroll_up(PAGE_ROWS);
            KeyOutcome::Continue
        }
        KeyCode::PageDown => {
            state.scroll_down(PAGE_ROWS);
            KeyOutcome::Continue
        }
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            state.insert_char(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

/// Takes over the terminal and runs the chat until the user quits.
pub async fn run_chat<G: InferenceGateway>(
    mut session: ChatSession<G>,
    model: String,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    info!(model = %model, "chat session started");

    let result = event_loop(&mut terminal, &mut session, &model).await;
    restore_terminal(&mut terminal)?;

    info!(turns = session.transcript().len(), "chat session ended");
    result
}

async fn event_loop<B: Backend, G: InferenceGateway>(
    terminal: &mut Terminal<B>,
    session: &mut ChatSession<G>,
    model: &str,
) -> Result<(), Box<dyn Error>> {
    let mut state = UiState::new();

    loop {
        draw(terminal, session, &mut state, model)?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match handle_key(&mut state, key) {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Quit => break,
                    KeyOutcome::Clear => {
                        session.clear();
                        state.after_clear();
                    }
                    KeyOutcome::Submit(text) => {
                        run_turn(terminal, session, &mut state, model, text).await?;
                        discard_pending_events()?;
                    }
                }
            }
            Event::Paste(text) => state.insert_str(&text),
            _ => {}
        }
    }

    Ok(())
}

/// Processes one submission: record the question, wait for the reply while
/// animating, then record the reply or show the error.
pub async fn run_turn<B: Backend, G: InferenceGateway>(
    terminal: &mut Terminal<B>,
    session: &mut ChatSession<G>,
    state: &mut UiState,
    model: &str,
    text: String,
) -> io::Result<()> {
    session.push_question(text.clone());
    state.begin_turn();
    draw(terminal, session, state, model)?;

    let outcome = {
        let mut ask = session.gateway().ask(&text);
        let mut ticker = tokio::time::interval(SPINNER_INTERVAL);
        loop {
            tokio::select! {
                result = &mut ask => break result,
                _ = ticker.tick() => draw(terminal, session, state, model)?,
            }
        }
    };

    state.end_turn();
    if let Err(err) = session.finish_turn(outcome) {
        state.show_error(err.to_string());
    }
    draw(terminal, session, state, model)
}

fn draw<B: Backend, G: InferenceGateway>(
    terminal: &mut Terminal<B>,
    session: &ChatSession<G>,
    state: &mut UiState,
    model: &str,
) -> io::Result<()> {
    let mut max_scroll = 0;
    terminal.draw(|f| {
        max_scroll = renderer::ui(
            f,
            &Screen {
                transcript: session.transcript(),
                stats: session.stats(),
                state: &*state,
                model,
            },
        );
    })?;
    state.clamp_scroll(max_scroll);
    Ok(())
}

fn discard_pending_events() -> io::Result<()> {
    let mut discarded = 0usize;
    while event::poll(Duration::ZERO)? {
        event::read()?;
        discarded += 1;
    }
    if discarded > 0 {
        debug!(discarded, "dropped input received while busy");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::UpstreamError;
    use crate::core::message::{Role, Turn};
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use std::sync::{Arc, Mutex};

    struct EchoGateway;

    #[async_trait]
    impl InferenceGateway for EchoGateway {
        async fn ask(&self, user_text: &str) -> Result<String, UpstreamError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(format!("echo: {user_text}"))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingGateway {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl InferenceGateway for RecordingGateway {
        async fn ask(&self, user_text: &str) -> Result<String, UpstreamError> {
            self.prompts.lock().unwrap().push(user_text.to_string());
            Ok(format!("reply {}", self.prompts.lock().unwrap().len()))
        }
    }

    struct DownGateway;

    #[async_trait]
    impl InferenceGateway for DownGateway {
        async fn ask(&self, _user_text: &str) -> Result<String, UpstreamError> {
            Err(UpstreamError::from_status(
                500,
                r#"{"error":{"message":"internal error"}}"#,
            ))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn test_terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(100, 24)).expect("terminal")
    }

    #[test]
    fn typing_then_enter_submits_text() {
        let mut state = UiState::new();
        for c in "Hi".chars() {
            assert_eq!(handle_key(&mut state, key(KeyCode::Char(c))), KeyOutcome::Continue);
        }
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Enter)),
            KeyOutcome::Submit("Hi".to_string())
        );
        assert!(state.input.is_empty());
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut state = UiState::new();
        assert_eq!(handle_key(&mut state, key(KeyCode::Enter)), KeyOutcome::Continue);
    }

    #[test]
    fn control_keys_map_to_actions() {
        let mut state = UiState::new();
        assert_eq!(handle_key(&mut state, ctrl('l')), KeyOutcome::Clear);
        assert_eq!(handle_key(&mut state, ctrl('c')), KeyOutcome::Quit);
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), KeyOutcome::Quit);
        assert!(state.input.is_empty());
    }

    #[test]
    fn backspace_and_scroll_keys_update_state() {
        let mut state = UiState::new();
        handle_key(&mut state, key(KeyCode::Char('a')));
        handle_key(&mut state, key(KeyCode::Char('b')));
        handle_key(&mut state, key(KeyCode::Backspace));
        assert_eq!(state.input, "a");

        handle_key(&mut state, key(KeyCode::PageUp));
        assert_eq!(state.scroll_from_bottom, PAGE_ROWS);
        handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.scroll_from_bottom, PAGE_ROWS - 1);
    }

    #[tokio::test]
    async fn run_turn_records_reply_and_clears_busy() {
        let mut terminal = test_terminal();
        let mut session = ChatSession::new(|| EchoGateway);
        let mut state = UiState::new();

        run_turn(&mut terminal, &mut session, &mut state, "m", "Hello".to_string())
            .await
            .expect("turn");

        assert!(!state.busy);
        assert!(state.error.is_none());
        assert_eq!(
            session.transcript().turns(),
            &[Turn::user("Hello"), Turn::assistant("echo: Hello")]
        );
    }

    #[tokio::test]
    async fn run_turn_failure_shows_error_and_keeps_question() {
        let mut terminal = test_terminal();
        let mut session = ChatSession::new(|| DownGateway);
        let mut state = UiState::new();

        run_turn(&mut terminal, &mut session, &mut state, "m", "Hello".to_string())
            .await
            .expect("turn");

        assert!(!state.busy);
        assert_eq!(
            state.error.as_deref(),
            Some("Model service returned HTTP 500: internal error")
        );
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().count_by_role(Role::User), 1);
    }

    #[tokio::test]
    async fn run_turn_grows_transcript_by_two_per_turn() {
        let mut terminal = test_terminal();
        let gateway = RecordingGateway::default();
        let prompts = gateway.prompts.clone();
        let mut session = ChatSession::new(move || gateway.clone());
        let mut state = UiState::new();

        let questions = ["first", "second **bold**", "third"];
        for (index, question) in questions.iter().enumerate() {
            run_turn(&mut terminal, &mut session, &mut state, "m", question.to_string())
                .await
                .expect("turn");
            assert_eq!(session.transcript().len(), 2 * (index + 1));
            assert_eq!(session.stats().questions_asked, index + 1);
        }

        for (index, turn) in session.transcript().iter().enumerate() {
            let expected = if index % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role(), expected);
        }
        assert_eq!(session.transcript().last(), Some(&Turn::assistant("reply 3")));
        assert_eq!(prompts.lock().unwrap().len(), questions.len());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn run_turn_forwards_only_the_latest_question() {
        let mut terminal = test_terminal();
        let gateway = RecordingGateway::default();
        let prompts = gateway.prompts.clone();
        let mut session = ChatSession::new(move || gateway.clone());
        let mut state = UiState::new();

        for question in ["What is Rust?", "And Go?"] {
            run_turn(&mut terminal, &mut session, &mut state, "m", question.to_string())
                .await
                .expect("turn");
        }

        assert_eq!(
            prompts.lock().unwrap().as_slice(),
            &["What is Rust?".to_string(), "And Go?".to_string()]
        );
        assert!(session.gateway_ready());
    }
}
