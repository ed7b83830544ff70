//! UI components: workflow header and run tab, endpoints, logs.

pub mod component;
pub mod endpoints;
pub mod logs;
pub mod workflow_info;

pub(crate) use component::Component;
pub use endpoints::EndpointsComponent;
pub use logs::LogsComponent;
pub use workflow_info::{RunComponent, WorkflowHeaderComponent};
