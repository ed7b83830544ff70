//! "Log Drains" tab: log lines of the active run.
//!
//! Rendering only reads [`LogsState`](super::LogsState); fetching is driven by
//! run changes and the manual refresh key, never by switching to this tab.

use crossterm::event::{KeyCode, KeyEvent};
use flowpanel_types::Effect;
use flowpanel_util::truncate_with_ellipsis;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::state::NO_RUN_MESSAGE;
use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct LogsComponent;

impl Component for LogsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.logs.scroll_down(),
            KeyCode::Up | KeyCode::Char('k') => app.logs.scroll_up(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.theme;
        let title = match app.logs.run() {
            Some(run) => format!("Log Drains · {}", truncate_with_ellipsis(&run.run_id, 36)),
            None => "Log Drains".to_string(),
        };
        let block = th::block(theme, Some(&title), true);

        let lines: Vec<Line> = if app.logs.run().is_none() {
            vec![Line::from(Span::styled(NO_RUN_MESSAGE, theme.text_muted_style()))]
        } else if let Some(error) = app.logs.error() {
            vec![
                Line::from(Span::styled(format!("Failed to load logs: {error}"), theme.status_error())),
                Line::from(Span::styled("Press r to retry", theme.text_muted_style())),
            ]
        } else if app.logs.is_loading() {
            vec![Line::from(Span::styled(
                format!("{} Loading logs…", app.throbber()),
                theme.text_muted_style(),
            ))]
        } else if app.logs.entries().is_empty() {
            vec![Line::from(Span::styled("No log lines for this run", theme.text_muted_style()))]
        } else {
            app.logs
                .lines()
                .into_iter()
                .skip(app.logs.offset)
                .map(|line| Line::from(Span::styled(line, theme.text_primary_style())))
                .collect()
        };

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowpanel_types::{Msg, RunHandle, RunLogEntry, ViewSelection, WorkflowRef};
    use ratatui::{Terminal, backend::TestBackend};

    fn render_logs(app: &mut App) -> String {
        let backend = TestBackend::new(80, 8);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                LogsComponent.render(frame, area, app);
            })
            .expect("draw");
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn opened_app() -> App {
        let workflow = WorkflowRef::current("wf-1");
        let mut app = App::new(workflow.clone(), "http://localhost:4111");
        app.open_workflow(workflow);
        app.select_view(ViewSelection::Logs);
        app
    }

    #[test]
    fn renders_empty_state_without_run() {
        let mut app = opened_app();
        let text = render_logs(&mut app);
        assert!(text.contains(NO_RUN_MESSAGE));
        assert!(!text.contains("·"));
    }

    #[test]
    fn renders_lines_scoped_to_triggered_run() {
        let mut app = opened_app();
        let triggered = app.trigger();
        let [Effect::TriggerWorkflow { tag, .. }] = triggered.as_slice() else {
            panic!("expected trigger, got {triggered:?}");
        };
        let tag = tag.clone();
        let effects = app.update(Msg::TriggerCompleted {
            tag,
            result: Ok(RunHandle::new("run-42")),
        });
        let [Effect::FetchRunLogs { run_id, request_id }] = effects.as_slice() else {
            panic!("expected run log fetch, got {effects:?}");
        };
        assert_eq!(run_id, "run-42");

        app.update(Msg::RunLogsLoaded {
            run_id: run_id.clone(),
            request_id: *request_id,
            result: Ok(vec![RunLogEntry {
                msg: "step fetch finished".to_string(),
                level: Some("info".to_string()),
                ..RunLogEntry::default()
            }]),
        });

        let text = render_logs(&mut app);
        assert!(text.contains("Log Drains · run-42"));
        assert!(text.contains("[INFO] step fetch finished"));
        assert!(!text.contains(NO_RUN_MESSAGE));
    }
}
