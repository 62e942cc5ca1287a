use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use shopchat_core::SubmitOutcome;
use tracing::debug;

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.scroll_chat_to_bottom(),
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Reply { id, result } => {
            app.apply_reply(id, result);
        }
    }
    app.follow_transcript();
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.widget.is_open() {
        handle_open(app, key);
    } else {
        handle_closed(app, key);
    }
}

fn handle_closed(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char(' ') => app.open_chat(),
        _ => {}
    }
}

fn handle_open(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_chat(),
        KeyCode::Enter => match app.send_message() {
            SubmitOutcome::Sent(request) => {
                debug!(request = %request.id, "request dispatched");
            }
            SubmitOutcome::Busy(id) => {
                debug!(request = %id, "still waiting for a reply");
            }
            SubmitOutcome::Empty => {}
        },
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::PageDown => app.scroll_down(app.half_page()),
        KeyCode::Backspace => app.widget.input_mut().backspace(),
        KeyCode::Delete => app.widget.input_mut().delete(),
        KeyCode::Left => app.widget.input_mut().move_left(),
        KeyCode::Right => app.widget.input_mut().move_right(),
        KeyCode::Home => app.widget.input_mut().move_home(),
        KeyCode::End => app.widget.input_mut().move_end(),
        KeyCode::Char(c) => app.widget.input_mut().insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.widget.is_open() {
                if app.close_area.is_some_and(|area| point_in_rect(x, y, area)) {
                    app.close_chat();
                }
            } else if app.toggle_area.is_some_and(|area| point_in_rect(x, y, area)) {
                app.open_chat();
            }
        }
        MouseEventKind::ScrollUp => {
            if app.widget.is_open() && app.chat_area.is_some_and(|area| point_in_rect(x, y, area)) {
                app.scroll_up(3);
            }
        }
        MouseEventKind::ScrollDown => {
            if app.widget.is_open() && app.chat_area.is_some_and(|area| point_in_rect(x, y, area)) {
                app.scroll_down(3);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crossterm::event::KeyEventState;
    use shopchat_core::{ChatRole, WidgetState};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_enter_opens_and_esc_closes() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.widget.state(), WidgetState::Open);
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.widget.state(), WidgetState::Closed);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_q_quits_only_when_closed() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, key(KeyCode::Char('c'))).unwrap();
        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit);
        assert_eq!(app.widget.input().value(), "q");

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_open() {
        let (mut app, _rx) = test_app();
        app.open_chat();
        let event = AppEvent::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: crossterm::event::KeyEventKind::Press,
            state: KeyEventState::NONE,
        });
        handle_event(&mut app, event).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_editing_keys() {
        let (mut app, _rx) = test_app();
        app.open_chat();
        type_text(&mut app, "abc");
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        handle_event(&mut app, key(KeyCode::Home)).unwrap();
        handle_event(&mut app, key(KeyCode::Delete)).unwrap();
        assert_eq!(app.widget.input().value(), "c");
    }

    #[test]
    fn test_enter_with_blank_input_does_nothing() {
        let (mut app, mut rx) = test_app();
        app.open_chat();
        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.widget.transcript().len(), 1);
        assert_eq!(app.widget.input().value(), "   ");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_enter_submits_and_reply_event_renders() {
        let (mut app, mut rx) = test_app();
        app.open_chat();
        type_text(&mut app, "<b>hej</b>");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        assert!(app.widget.input().is_empty());
        assert!(app.widget.transcript().typing().is_some());
        assert_eq!(app.widget.transcript().count_role(ChatRole::User), 1);

        let reply = rx.recv().await.unwrap();
        handle_event(&mut app, reply).unwrap();

        assert!(app.widget.transcript().typing().is_none());
        assert_eq!(app.widget.transcript().count_role(ChatRole::Assistant), 2);
        let user = app
            .widget
            .transcript()
            .messages()
            .find(|m| m.role == ChatRole::User)
            .unwrap();
        assert_eq!(user.content, "<b>hej</b>");
    }

    #[test]
    fn test_click_toggle_and_close_areas() {
        let (mut app, _rx) = test_app();
        app.toggle_area = Some(Rect::new(70, 22, 10, 1));
        app.close_area = Some(Rect::new(76, 5, 3, 1));

        handle_event(&mut app, click(10, 10)).unwrap();
        assert!(!app.widget.is_open());

        handle_event(&mut app, click(72, 22)).unwrap();
        assert!(app.widget.is_open());

        // the toggle is hidden while open, clicking where it was does nothing
        handle_event(&mut app, click(72, 22)).unwrap();
        assert!(app.widget.is_open());

        handle_event(&mut app, click(77, 5)).unwrap();
        assert!(!app.widget.is_open());
    }

    #[test]
    fn test_resize_returns_to_newest_entry() {
        let (mut app, _rx) = test_app();
        app.chat_height = 3;
        app.chat_width = 20;
        for i in 0..6 {
            app.widget.render(ChatRole::User, &format!("pytanie {}", i));
        }
        app.follow_transcript();
        app.chat_scroll = 0;

        handle_event(&mut app, AppEvent::Resize).unwrap();
        assert_eq!(app.chat_scroll, app.total_chat_lines() - 3);
    }
}
