//! "Endpoints" tab: HTTP endpoints available for the bound workflow.

use crossterm::event::{KeyCode, KeyEvent};
use flowpanel_types::Effect;
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

/// Width of the method column, wide enough for `DELETE`.
const METHOD_WIDTH: usize = 7;

#[derive(Debug, Default)]
pub struct EndpointsComponent {
    list_state: ListState,
}

impl Component for EndpointsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                app.endpoints.select_next();
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.endpoints.select_prev();
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char('c') => app.copy_selected_endpoint(),
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.theme;
        let block = th::block(theme, Some("Endpoints"), true);

        if app.endpoints.endpoints().is_empty() {
            let empty = Paragraph::new(Span::styled("No workflow selected", theme.text_muted_style())).block(block);
            frame.render_widget(empty, rect);
            return;
        }

        let items: Vec<ListItem> = app
            .endpoints
            .endpoints()
            .iter()
            .map(|endpoint| {
                let method_style = if endpoint.method == "GET" {
                    theme.status_success()
                } else {
                    theme.status_warning()
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            format!("{:<width$}", endpoint.method, width = METHOD_WIDTH),
                            method_style.add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(endpoint.path.clone(), theme.text_primary_style()),
                    ]),
                    Line::from(Span::styled(
                        format!("{:width$}{}", "", endpoint.description, width = METHOD_WIDTH),
                        theme.text_muted_style(),
                    )),
                ])
            })
            .collect();

        self.list_state.select(Some(app.endpoints.selected_index()));
        let list = List::new(items)
            .block(block)
            .highlight_style(theme.selection_style())
            .highlight_symbol("▸ ");
        frame.render_stateful_widget(list, rect, &mut self.list_state);
    }
}
