//! Component abstraction for the panel.
//!
//! Components own local UI behavior, translate input into state changes on
//! [`App`], and report side effects back as [`Effect`]s instead of performing
//! them. The runtime hands those effects to the command layer.

use crossterm::event::KeyEvent;
use flowpanel_types::{Effect, Msg};
use ratatui::{Frame, layout::Rect};

use crate::app::App;

pub(crate) trait Component {
    /// Handle an application-level message.
    ///
    /// The default forwards the message to [`App::update`].
    fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        app.update(msg)
    }

    /// Handle a key press while this component is active.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Draw the component into `rect`.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}
