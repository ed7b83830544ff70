//! Header line: workflow name, id badge, mode, and step count.

use flowpanel_types::step_count_label;
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::theme_helpers as th;

/// Shown in place of the name while the definition is being fetched.
pub const LOADING_TITLE: &str = "Loading…";

#[derive(Debug, Default)]
pub struct WorkflowHeaderComponent;

impl WorkflowHeaderComponent {
    /// Name to show for the bound workflow.
    fn title(app: &App) -> String {
        if app.resolver.is_loading() {
            return LOADING_TITLE.to_string();
        }
        match app.resolver.definition() {
            Some(definition) if !definition.name.trim().is_empty() => definition.name.clone(),
            _ if app.workflow.is_blank() => "No workflow".to_string(),
            _ => app.workflow.id.clone(),
        }
    }
}

impl Component for WorkflowHeaderComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.theme;
        let mut spans = vec![
            Span::styled(Self::title(app), theme.accent_emphasis_style()),
            Span::raw("  "),
            Span::styled(format!(" {} ", app.workflow.id), theme.badge_style()),
            Span::raw(" "),
            Span::styled(app.workflow.mode.as_str(), theme.text_muted_style().add_modifier(Modifier::ITALIC)),
            Span::raw("  "),
            Span::styled(step_count_label(app.resolver.step_count()), theme.text_secondary_style()),
        ];
        if let Some(error) = app.resolver.error() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(format!("⚠ {error} (r to retry)"), theme.status_error()));
        }

        let header = Paragraph::new(Line::from(spans)).block(th::block(theme, None, false));
        frame.render_widget(header, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowpanel_types::{Effect, Msg, WorkflowDefinition, WorkflowRef, WorkflowStepDescriptor};
    use ratatui::{Terminal, backend::TestBackend};

    fn render_header(app: &mut App) -> String {
        let backend = TestBackend::new(100, 3);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                WorkflowHeaderComponent.render(frame, area, app);
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

    fn loaded_app(step_keys: &[&str]) -> App {
        let workflow = WorkflowRef::current("wf-1");
        let mut app = App::new(workflow.clone(), "http://localhost:4111");
        let effects = app.open_workflow(workflow);
        let Some(Effect::FetchWorkflow(tag)) = effects.into_iter().next() else {
            panic!("expected fetch");
        };
        let steps = step_keys
            .iter()
            .map(|key| (key.to_string(), WorkflowStepDescriptor { id: key.to_string(), ..Default::default() }))
            .collect();
        app.update(Msg::WorkflowLoaded {
            tag,
            result: Ok(WorkflowDefinition {
                name: "Weather".to_string(),
                description: None,
                steps,
            }),
        });
        app
    }

    #[test]
    fn renders_plural_step_count() {
        let mut app = loaded_app(&["fetch", "plan", "notify"]);
        let text = render_header(&mut app);
        assert!(text.contains("Weather"));
        assert!(text.contains("wf-1"));
        assert!(text.contains("3 steps"));
    }

    #[test]
    fn renders_singular_step_count() {
        let mut app = loaded_app(&["only"]);
        let text = render_header(&mut app);
        assert!(text.contains("1 step"));
        assert!(!text.contains("1 steps"));
    }

    #[test]
    fn shows_loading_while_fetch_is_outstanding() {
        let workflow = WorkflowRef::legacy("wf-1");
        let mut app = App::new(workflow.clone(), "http://localhost:4111");
        app.open_workflow(workflow);
        let text = render_header(&mut app);
        assert!(text.contains(LOADING_TITLE));
        assert!(text.contains("0 steps"));
        assert!(text.contains("legacy"));
    }
}
