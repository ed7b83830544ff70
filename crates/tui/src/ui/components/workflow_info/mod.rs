//! Workflow identity, definition lookup, and run triggering.

pub mod coordinator;
pub mod header_component;
pub mod resolver;
pub mod run_component;
pub mod run_input;

pub use coordinator::{RunCoordinator, RunReceiver, RunState, TriggerRejected};
pub use header_component::WorkflowHeaderComponent;
pub use resolver::WorkflowResolver;
pub use run_component::RunComponent;
pub use run_input::RunInputState;
