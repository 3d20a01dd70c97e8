//! Markdown rendering for chat messages.
//!
//! Messages are parsed with `pulldown-cmark` into styled logical lines
//! (paragraphs, headings, list items, code block lines) and then wrapped to
//! the pane width, so the row count used for scrolling is the row count drawn.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;

use crate::ui::wrap::{to_line, wrap_styled, StyledChar};

const CODE_COLOR: Color = Color::Yellow;

fn code_style(base: Style) -> Style {
    base.fg(CODE_COLOR)
}

fn heading_style(base: Style, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        _ => base.add_modifier(Modifier::BOLD),
    }
}

struct MarkdownRenderer {
    base: Style,
    lines: Vec<Vec<StyledChar>>,
    current: Vec<StyledChar>,
    style_stack: Vec<Style>,
    // `Some(n)` is an ordered list whose next item is numbered `n`.
    list_stack: Vec<Option<u64>>,
    in_code_block: bool,
}

impl MarkdownRenderer {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![base],
            list_stack: Vec::new(),
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn push_text(&mut self, text: &str, style: Style) {
        self.current.extend(text.chars().map(|c| (c, style)));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    /// Ends a block with one blank separator row; never doubles them up.
    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|line| !line.is_empty()) {
            self.lines.push(Vec::new());
        }
    }

    fn code_text(&mut self, text: &str) {
        let style = code_style(self.base);
        for segment in text.split_inclusive('\n') {
            let content = segment.strip_suffix('\n');
            self.push_text(content.unwrap_or(segment), style);
            if content.is_some() {
                // Blank rows inside a code block are content.
                self.lines.push(std::mem::take(&mut self.current));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.style_stack.push(heading_style(self.base, level));
            }
            Tag::List(start) => {
                self.flush();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}. ");
                        *next += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                let indent = "  ".repeat(depth);
                self.push_text(&indent, self.base);
                self.push_text(&marker, self.base.add_modifier(Modifier::BOLD));
            }
            Tag::CodeBlock(_) => {
                self.blank();
                self.in_code_block = true;
            }
            Tag::BlockQuote(_) => {
                self.flush();
                let style = self.style().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
                self.style_stack.push(style);
            }
            Tag::Emphasis => self.push_style(Modifier::ITALIC),
            Tag::Strong => self.push_style(Modifier::BOLD),
            Tag::Strikethrough => self.push_style(Modifier::CROSSED_OUT),
            Tag::Link { .. } => self.push_style(Modifier::UNDERLINED),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.blank(),
            TagEnd::Heading(_) => {
                self.pop_style();
                self.blank();
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::BlockQuote(_) => {
                self.pop_style();
                self.blank();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style()
            }
            _ => {}
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code_block => self.code_text(&text),
            Event::Text(text) => self.push_text(&text, self.style()),
            Event::Code(code) => self.push_text(&code, code_style(self.style())),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_text(html.trim_end_matches('\n'), self.style())
            }
            Event::SoftBreak => self.push_text(" ", self.style()),
            Event::HardBreak => self.lines.push(std::mem::take(&mut self.current)),
            Event::Rule => {
                self.flush();
                self.push_text("───", self.base.fg(Color::DarkGray));
                self.blank();
            }
            Event::TaskListMarker(done) => {
                self.push_text(if done { "[x] " } else { "[ ] " }, self.style())
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Vec<StyledChar>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            self.lines.push(Vec::new());
        }
        self.lines
    }
}

/// Renders `content` as markdown on top of `base` and wraps the result to
/// `width` columns (0 disables wrapping). Always yields at least one row.
pub fn render_markdown(content: &str, base: Style, width: usize) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = MarkdownRenderer::new(base);
    for event in Parser::new_ext(content, options) {
        renderer.event(event);
    }

    renderer
        .finish()
        .iter()
        .flat_map(|line| wrap_styled(line, width))
        .map(to_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    fn span_style(line: &Line, content: &str) -> Style {
        line.spans
            .iter()
            .find(|span| span.content == content)
            .unwrap_or_else(|| panic!("no span {content:?} in {line:?}"))
            .style
    }

    #[test]
    fn plain_text_is_one_row() {
        let lines = render_markdown("Hi there", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["Hi there"]);
        assert_eq!(lines[0].spans.len(), 1);
    }

    #[test]
    fn empty_content_still_yields_a_row() {
        assert_eq!(texts(&render_markdown("", Style::default(), 80)), vec![""]);
    }

    #[test]
    fn strong_and_emphasis_drop_their_markers() {
        let lines = render_markdown("**Rust** is *fast*", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["Rust is fast"]);
        assert!(span_style(&lines[0], "Rust").add_modifier.contains(Modifier::BOLD));
        assert!(span_style(&lines[0], "fast").add_modifier.contains(Modifier::ITALIC));
        assert_eq!(span_style(&lines[0], " is "), Style::default());
    }

    #[test]
    fn inline_code_is_highlighted_without_backticks() {
        let lines = render_markdown("run `cargo` now", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["run cargo now"]);
        assert_eq!(span_style(&lines[0], "cargo").fg, Some(CODE_COLOR));
    }

    #[test]
    fn base_style_carries_through_emphasis() {
        let base = Style::default().fg(Color::Cyan);
        let lines = render_markdown("a **b**", base, 80);
        let bold = span_style(&lines[0], "b");
        assert_eq!(bold.fg, Some(Color::Cyan));
        assert!(bold.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_row() {
        let lines = render_markdown("first\n\nsecond\nline", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["first", "", "second line"]);
    }

    #[test]
    fn lists_get_markers() {
        let lines = render_markdown("Steps:\n\n- one\n- two", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["Steps:", "", "- one", "- two"]);

        let lines = render_markdown("3. a\n4. b", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["3. a", "4. b"]);
    }

    #[test]
    fn nested_lists_are_indented() {
        let lines = render_markdown("- outer\n  - inner\n- last", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["- outer", "  - inner", "- last"]);
    }

    #[test]
    fn headings_are_bold() {
        let lines = render_markdown("# Title\n\nbody", Style::default(), 80);
        assert_eq!(texts(&lines), vec!["Title", "", "body"]);
        let style = span_style(&lines[0], "Title");
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn fenced_code_keeps_its_lines() {
        let content = "Example:\n\n```rust\nfn main() {}\n\nlet x = 1;\n```\n\nDone.";
        let lines = render_markdown(content, Style::default(), 80);
        assert_eq!(
            texts(&lines),
            vec!["Example:", "", "fn main() {}", "", "let x = 1;", "", "Done."]
        );
        assert_eq!(span_style(&lines[2], "fn main() {}").fg, Some(CODE_COLOR));
    }

    #[test]
    fn wrapping_happens_after_styling() {
        let lines = render_markdown("**bold words here**", Style::default(), 10);
        assert_eq!(texts(&lines), vec!["bold words", "here"]);
        for line in &lines {
            for span in &line.spans {
                assert!(span.style.add_modifier.contains(Modifier::BOLD));
            }
        }
    }
}
