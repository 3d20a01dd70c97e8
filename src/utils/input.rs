//! Input cleanup for text that arrives from the terminal.

/// Makes pasted text safe to draw in the input field.
///
/// Tabs expand to four spaces, carriage returns become newlines, and any
/// other control character is dropped.
pub fn sanitize_text_input(text: &str) -> String {
    text.chars()
        .fold(String::with_capacity(text.len()), |mut out, c| {
            match c {
                '\t' => out.push_str("    "),
                '\r' | '\n' => out.push('\n'),
                c if c.is_control() => {}
                c => out.push(c),
            }
            out
        })
}
