use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use flowpanel_types::{Effect, ViewSelection};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph, Tabs},
};

use super::components::{Component, EndpointsComponent, LogsComponent, RunComponent, WorkflowHeaderComponent};
use super::theme::theme_helpers as th;
use crate::app::App;

/// Root view: header, tab bar, the active tab body, and a footer.
///
/// Global shortcuts are handled here unless the run input is being edited,
/// in which case every key goes to the run tab.
#[derive(Debug, Default)]
pub struct MainView {
    header: WorkflowHeaderComponent,
    run_view: RunComponent,
    endpoints_view: EndpointsComponent,
    logs_view: LogsComponent,
}

impl MainView {
    pub fn new() -> Self {
        Self::default()
    }

    fn active_view(&mut self, view: ViewSelection) -> &mut dyn Component {
        match view {
            ViewSelection::Run => &mut self.run_view,
            ViewSelection::Endpoints => &mut self.endpoints_view,
            ViewSelection::Logs => &mut self.logs_view,
        }
    }

    fn render_tabs(frame: &mut Frame, rect: Rect, app: &App) {
        let theme = &*app.theme;
        let titles: Vec<Line> = ViewSelection::ALL
            .iter()
            .map(|view| Line::from(format!(" {} {} ", view.index() + 1, view.label())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(app.view().index())
            .style(theme.text_muted_style())
            .highlight_style(theme.accent_emphasis_style())
            .divider(Span::styled("│", theme.text_muted_style()));
        frame.render_widget(tabs, rect);
    }

    fn render_footer(frame: &mut Frame, rect: Rect, app: &App) {
        let theme = &*app.theme;
        let mut spans: Vec<Span> = Vec::new();
        if let Some(notice) = app.notice.as_deref() {
            spans.push(Span::styled(format!("{notice}  "), theme.text_secondary_style()));
        }
        let hints: &[(&str, &str)] = match app.view() {
            _ if app.run_input.is_editing() => &[("Enter", "trigger"), ("Esc", "stop editing")],
            ViewSelection::Run => &[("i", "edit input"), ("Enter", "trigger"), ("r", "refresh"), ("y", "copy id"), ("q", "quit")],
            ViewSelection::Endpoints => &[("↑↓", "select"), ("c", "copy url"), ("y", "copy id"), ("q", "quit")],
            ViewSelection::Logs => &[("↑↓", "scroll"), ("r", "refresh"), ("y", "copy id"), ("q", "quit")],
        };
        for (key, label) in hints {
            spans.extend(th::key_hint(theme, key, label));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), rect);
    }
}

impl Component for MainView {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Effect::Quit];
        }
        if app.view() == ViewSelection::Run && app.run_input.is_editing() {
            return self.run_view.handle_key_events(app, key);
        }

        match key.code {
            KeyCode::Char('q') => vec![Effect::Quit],
            KeyCode::Tab => {
                app.select_view(app.view().next());
                Vec::new()
            }
            KeyCode::BackTab => {
                app.select_view(app.view().prev());
                Vec::new()
            }
            KeyCode::Char(digit @ '1'..='3') => {
                let index = digit as usize - '1' as usize;
                if let Some(view) = ViewSelection::from_index(index) {
                    app.select_view(view);
                }
                Vec::new()
            }
            KeyCode::Char('y') => app.copy_workflow_id(),
            KeyCode::Char('r') => app.refresh(),
            _ => self.active_view(app.view()).handle_key_events(app, key),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        frame.render_widget(Block::new().style(th::panel_style(&*app.theme)), rect);
        let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(rect);

        self.header.render(frame, header_area, app);
        Self::render_tabs(frame, tabs_area, app);
        let view = app.view();
        self.active_view(view).render(frame, body_area, app);
        Self::render_footer(frame, footer_area, app);
    }
}
