//! "Run" tab: trigger input and the state of the active run.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use flowpanel_types::Effect;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::coordinator::RunState;
use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

const INPUT_PLACEHOLDER: &str = "{} (press i to edit the JSON input)";

#[derive(Debug, Default)]
pub struct RunComponent;

impl RunComponent {
    fn handle_editing_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => app.run_input.set_editing(false),
            KeyCode::Enter => {
                app.run_input.set_editing(false);
                return app.trigger();
            }
            KeyCode::Backspace => app.run_input.backspace(),
            KeyCode::Left => app.run_input.move_left(),
            KeyCode::Right => app.run_input.move_right(),
            KeyCode::Char(character) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.run_input.insert_char(character)
            }
            _ => {}
        }
        Vec::new()
    }

    fn status_lines<'a>(app: &'a App) -> Vec<Line<'a>> {
        let theme = &*app.theme;
        let state = match app.coordinator.run_state() {
            RunState::NoRun => Span::styled("No run yet", theme.text_muted_style()),
            RunState::Triggering => Span::styled(format!("{} Triggering…", app.throbber()), theme.status_warning()),
            RunState::HasRun => Span::styled("Run active", theme.status_success()),
        };
        let mut lines = vec![Line::from(vec![Span::styled("State  ", theme.text_secondary_style()), state])];

        if let Some(run) = app.coordinator.current_run() {
            lines.push(Line::from(vec![
                Span::styled("Run    ", theme.text_secondary_style()),
                Span::styled(run.run_id.as_str(), theme.text_primary_style()),
            ]));
        }
        if let Some(error) = app.coordinator.last_error() {
            lines.push(Line::from(vec![
                Span::styled("Error  ", theme.text_secondary_style()),
                Span::styled(error, theme.status_error()),
            ]));
        }
        if let Some(description) = app.resolver.definition().and_then(|definition| definition.description.as_deref()) {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(description, theme.text_muted_style())));
        }
        if let Some(definition) = app.resolver.definition() {
            lines.push(Line::default());
            for (key, step) in &definition.steps {
                let mut spans = vec![
                    Span::styled("• ", theme.accent_primary_style()),
                    Span::styled(key.as_str(), theme.text_primary_style()),
                ];
                if let Some(description) = step.description.as_deref() {
                    spans.push(Span::styled(format!("  {description}"), theme.text_muted_style()));
                }
                lines.push(Line::from(spans));
            }
        }
        lines
    }
}

impl Component for RunComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if app.run_input.is_editing() {
            return Self::handle_editing_key(app, key);
        }
        match key.code {
            KeyCode::Char('i') | KeyCode::Char('e') => {
                app.run_input.set_editing(true);
                Vec::new()
            }
            KeyCode::Enter => app.trigger(),
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let [input_area, status_area] = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(rect);
        let theme = &*app.theme;
        let editing = app.run_input.is_editing();

        let input_line = if app.run_input.text().is_empty() && !editing {
            Line::from(Span::styled(INPUT_PLACEHOLDER, theme.text_muted_style()))
        } else {
            Line::from(Span::styled(app.run_input.text(), theme.text_primary_style()))
        };
        let input = Paragraph::new(input_line).block(th::block(theme, Some("Input (JSON)"), editing));
        frame.render_widget(input, input_area);

        if editing {
            let before_cursor = &app.run_input.text()[..app.run_input.cursor()];
            let column = input_area.x + 1 + before_cursor.width() as u16;
            frame.set_cursor_position(Position::new(
                column.min(input_area.right().saturating_sub(2)),
                input_area.y + 1,
            ));
        }

        let status = Paragraph::new(Self::status_lines(app))
            .block(th::block(theme, Some("Run"), false))
            .wrap(Wrap { trim: false });
        frame.render_widget(status, status_area);
    }
}
