use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use shopchat_core::{sanitize_for_terminal, ChatRole, Entry};
use unicode_width::UnicodeWidthChar;

use crate::app::App;

const PANEL_WIDTH: u16 = 56;
const PANEL_HEIGHT: u16 = 22;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_footer(app, frame, footer_area);

    if app.widget.toggle_visible() {
        app.close_area = None;
        app.chat_area = None;
        render_toggle(app, frame, body_area);
    } else {
        app.toggle_area = None;
        render_panel(app, frame, body_area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" shopchat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = if app.widget.is_open() {
        &[("Enter", "send"), ("Esc", "close"), ("PgUp/PgDn", "scroll"), ("Ctrl+C", "quit")]
    } else {
        &[("Enter/c", "open chat"), ("q", "quit")]
    };

    let mut spans = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(format!(" {} ", key), Style::default().fg(Color::Yellow).bold()));
        spans.push(Span::styled(format!("{} ", action), Style::default().fg(Color::DarkGray)));
    }

    if app.widget.is_waiting() {
        spans.push(Span::styled(
            " waiting for reply",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Rectangle of the given size anchored to the bottom-right corner of `area`
fn bottom_right(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + area.width - width,
        area.y + area.height - height,
        width,
        height,
    )
}

fn render_toggle(app: &mut App, frame: &mut Frame, area: Rect) {
    let label = Line::from(app.widget.strings().toggle_label);
    let button_area = bottom_right(area, label.width() as u16 + 4, 3);
    app.toggle_area = Some(button_area);

    let button = Paragraph::new(label.centered())
        .style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(button, button_area);
}

fn render_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let panel_area = bottom_right(area, PANEL_WIDTH, PANEL_HEIGHT);
    let strings = app.widget.strings();

    frame.render_widget(Clear, panel_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", strings.title));
    let inner = block.inner(panel_area);
    frame.render_widget(block, panel_area);

    // Close control sits on the top border, right-aligned
    if panel_area.width >= 6 {
        let close_area = Rect::new(panel_area.x + panel_area.width - 4, panel_area.y, 3, 1);
        app.close_area = Some(close_area);
        frame.render_widget(
            Paragraph::new(Span::styled("[x]", Style::default().fg(Color::Red).bold())),
            close_area,
        );
    } else {
        app.close_area = None;
    }

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);

    app.chat_area = Some(chat_area);
    let resized = app.chat_width != chat_area.width || app.chat_height != chat_area.height;
    app.chat_height = chat_area.height;
    app.chat_width = chat_area.width;
    if resized {
        // Wrapping changed, so the old offset no longer lands on the newest entry
        app.scroll_chat_to_bottom();
    }

    render_messages(app, frame, chat_area);
    render_input(app, frame, input_area);
}

/// The message list as drawn. `App` counts its wrapped lines with the same
/// paragraph, so scrolling and drawing always agree.
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let strings = app.widget.strings();
    let user_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let assistant_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line<'static>> = Vec::new();

    for entry in app.widget.transcript().entries() {
        match entry {
            Entry::Message(msg) => {
                let (label, style) = match msg.role {
                    ChatRole::User => (strings.user_label, user_style),
                    ChatRole::Assistant => (strings.assistant_label, assistant_style),
                };
                lines.push(Line::from(Span::styled(format!("{}:", label), style)));
                // Raw spans only: message text is never parsed for markup
                for line in msg.content.lines() {
                    lines.push(Line::from(Span::raw(sanitize_for_terminal(line).into_owned())));
                }
                if msg.content.is_empty() {
                    lines.push(Line::default());
                }
            }
            Entry::Typing(_) => {
                lines.push(Line::from(Span::styled(
                    format!("{}:", strings.assistant_label),
                    assistant_style,
                )));
                // Animated dots: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    dots,
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
        lines.push(Line::default());
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
}

fn render_messages(app: &App, frame: &mut Frame, area: Rect) {
    let chat = chat_paragraph(app).scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

/// Slice of the input that fits in `inner_width` columns with the cursor
/// visible, and the cursor's column within it. Widths are display columns.
fn input_window(text: &str, cursor: usize, inner_width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let col = |c: &char| c.width().unwrap_or(0);

    // Drop characters off the left until the cursor cell fits
    let mut start = 0;
    let mut cursor_x: usize = chars[..cursor].iter().map(col).sum();
    while start < cursor && cursor_x >= inner_width {
        cursor_x -= col(&chars[start]);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for c in &chars[start..] {
        let w = col(c);
        if used + w > inner_width {
            break;
        }
        visible.push(*c);
        used += w;
    }

    (visible, cursor_x)
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input = app.widget.input();
    let border_color = if app.widget.is_waiting() { Color::DarkGray } else { Color::Yellow };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_window(input.value(), input.cursor(), inner_width);

    let paragraph = if input.is_empty() {
        Paragraph::new(Span::styled(
            app.widget.strings().input_hint,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(sanitize_for_terminal(&visible_text).into_owned())
            .style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(paragraph.block(input_block), area);

    if app.widget.input_focused() && area.width > 2 {
        frame.set_cursor_position((area.x + cursor_x as u16 + 1, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut text = String::new();
        for (i, cell) in buffer.content.iter().enumerate() {
            text.push_str(cell.symbol());
            if (i + 1) % width == 0 {
                text.push('\n');
            }
        }
        text
    }

    #[test]
    fn test_closed_shows_toggle_only() {
        let (mut app, _rx) = test_app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let toggle = app.toggle_area.unwrap();
        assert_eq!(toggle.x + toggle.width, 80);
        assert_eq!(toggle.y + toggle.height, 23);
        assert!(app.close_area.is_none());
        assert!(!buffer_text(&terminal).contains("Asystent sklepu"));
    }

    #[test]
    fn test_open_panel_shows_messages_literally() {
        let (mut app, _rx) = test_app();
        app.open_chat();
        app.widget.render(ChatRole::User, "<b>tekst</b>");
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Asystent sklepu"));
        assert!(text.contains("<b>tekst</b>"));
        assert!(text.contains("[x]"));
        assert!(app.toggle_area.is_none());
        assert!(app.close_area.is_some());
        assert_eq!(app.chat_width, PANEL_WIDTH - 2);
    }

    #[test]
    fn test_bottom_right_clamps_to_area() {
        let area = Rect::new(0, 1, 30, 10);
        assert_eq!(bottom_right(area, 56, 22), area);
        assert_eq!(bottom_right(area, 10, 3), Rect::new(20, 8, 10, 3));
    }

    #[test]
    fn test_long_reply_scrolls_into_view() {
        let (mut app, _rx) = test_app();
        app.open_chat();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        for i in 1..=3 {
            app.widget.render(ChatRole::User, &format!("Pytanie numer {}", i));
        }
        let sentence = "Przesyłka kurierska kosztuje piętnaście złotych, a zwrot jest możliwy w ciągu czternastu dni od otrzymania przesyłki.";
        let paragraph = vec![sentence; 5].join(" ");
        let reply = format!("{}\n{}\nOSTATNIESLOWO", paragraph, paragraph);
        app.widget.render(ChatRole::Assistant, &reply);
        app.follow_transcript();

        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(buffer_text(&terminal).contains("OSTATNIESLOWO"));

        // Scrolling back down is clamped to the same bottom
        app.scroll_up(10);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(!buffer_text(&terminal).contains("OSTATNIESLOWO"));

        app.scroll_down(u16::MAX);
        assert_eq!(app.chat_scroll, app.total_chat_lines() - app.chat_height);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(buffer_text(&terminal).contains("OSTATNIESLOWO"));
    }

    #[test]
    fn test_resize_keeps_newest_entry_visible() {
        let (mut app, _rx) = test_app();
        app.open_chat();
        let sentence = "Dostawa do paczkomatu trwa zwykle dwa dni robocze.";
        app.widget.render(ChatRole::Assistant, &format!("{} KONIEC", vec![sentence; 12].join(" ")));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(buffer_text(&terminal).contains("KONIEC"));

        let mut narrow = Terminal::new(TestBackend::new(40, 24)).unwrap();
        narrow.draw(|frame| render(&mut app, frame)).unwrap();
        narrow.draw(|frame| render(&mut app, frame)).unwrap();
        assert_eq!(app.chat_width, 38);
        assert!(buffer_text(&narrow).contains("KONIEC"));
    }

    #[test]
    fn test_input_window_counts_display_columns() {
        // each emoji takes two columns
        let (visible, cursor_x) = input_window("👋👋ab", 6, 10);
        assert_eq!(visible, "👋👋ab");
        assert_eq!(cursor_x, 6);

        let (visible, cursor_x) = input_window("👋👋👋👋", 4, 5);
        assert_eq!(visible, "👋👋");
        assert_eq!(cursor_x, 4);

        let (visible, cursor_x) = input_window("zażółć", 2, 10);
        assert_eq!(visible, "zażółć");
        assert_eq!(cursor_x, 2);
    }
}
