pub mod endpoints_component;
pub mod state;

pub use endpoints_component::EndpointsComponent;
pub use state::EndpointsState;
