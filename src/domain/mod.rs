pub mod customer;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod records;
pub mod service;
pub mod workflow;

pub use customer::PastePreview;
pub use errors::*;
pub use models::*;
pub use records::*;
pub use service::{Dispatcher, PlatformEndpoints};
pub use workflow::{ActionGates, DebugView, ShippingSession, StateSummary, WorkflowState};
