//! Runtime: event loop and input routing for the panel.
//!
//! Responsibilities
//! - Own the terminal lifecycle (alternate screen, raw mode).
//! - Drive one `tokio::select!` loop over terminal input, an animation ticker,
//!   and the pending network tasks.
//! - Route keys to [`MainView`], hand returned effects to the command layer,
//!   and feed completions back through [`App::update`].
//!
//! Ticking is fast (100 ms) only while a request is outstanding, so the
//! throbber animates; otherwise it idles at 5 s.

use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use flowpanel_types::{Effect, Msg, WorkflowRef};
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::app::App;
use crate::cmd::{self, CommandContext};
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;

type PanelTerminal = Terminal<CrosstermBackend<std::io::Stdout>>;

/// Forward terminal input from a blocking reader thread over a channel.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(256);
    std::thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(250)) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if sender.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!("Failed to read event: {}", error);
                        break;
                    }
                },
                Ok(false) => {
                    if sender.is_closed() {
                        break;
                    }
                }
                Err(error) => {
                    warn!("Failed to poll events: {}", error);
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<PanelTerminal> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn cleanup_terminal(terminal: &mut PanelTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut PanelTerminal, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        main_view.render(frame, area, app);
    })?;
    Ok(())
}

/// Hand effects to the command layer. Returns `true` when a quit was requested.
fn process_effects(
    context: &CommandContext,
    app: &mut App,
    main_view: &mut MainView,
    effects: Vec<Effect>,
    pending: &mut FuturesUnordered<JoinHandle<Msg>>,
) -> bool {
    if effects.is_empty() {
        return false;
    }
    let quit = effects.contains(&Effect::Quit);
    let batch = cmd::run_from_effects(context, effects);
    pending.extend(batch.pending);
    for msg in batch.immediate {
        // Immediate messages (clipboard notices) never request more work.
        let _ = main_view.handle_message(app, msg);
    }
    quit
}

/// Entry point for the TUI runtime: sets up the terminal, opens `workflow`,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_app(workflow: WorkflowRef, base_url: String, context: CommandContext) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut main_view = MainView::new();
    let mut app = App::new(workflow.clone(), base_url);
    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();

    info!(%workflow, "opening panel");
    let initial_effects = main_view.handle_message(&mut app, Msg::OpenWorkflow(workflow));

    let mut terminal = setup_terminal()?;
    process_effects(&context, &mut app, &mut main_view, initial_effects, &mut pending);

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(&mut terminal, &mut app, &mut main_view)?;

    loop {
        let target_interval = if app.is_busy() { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let effects = tokio::select! {
            maybe_event = input_receiver.recv() => {
                match maybe_event {
                    Some(Event::Key(key_event)) if key_event.is_press() => main_view.handle_key_events(&mut app, key_event),
                    Some(Event::Resize(width, height)) => main_view.handle_message(&mut app, Msg::Resize(width, height)),
                    Some(_) => Vec::new(),
                    // Input channel closed; shut down cleanly.
                    None => break,
                }
            }

            _ = ticker.tick() => main_view.handle_message(&mut app, Msg::Tick),

            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(msg) => main_view.handle_message(&mut app, msg),
                    Err(error) => main_view.handle_message(&mut app, Msg::Notice(format!("Background task failed: {error}"))),
                }
            }

            _ = signal::ctrl_c() => break,
        };

        if process_effects(&context, &mut app, &mut main_view, effects, &mut pending) {
            break;
        }
        render(&mut terminal, &mut app, &mut main_view)?;
    }

    cleanup_terminal(&mut terminal)?;
    Ok(())
}
