//! Tool surface for the Tontouma conversational engine
//!
//! The dialogue engine never talks to the scheduler directly; it dispatches
//! model tool calls through the registry, which validates, times out, and
//! answers in structured payloads the model can recover from.

pub mod registry;
pub mod scheduling_tools;
pub mod tool;

pub use registry::{ToolExecutor, ToolRegistry};
pub use scheduling_tools::{
    scheduling_registry, AvailableSlotsTool, BookAppointmentTool, SearchDoctorsTool,
};
pub use tool::{check_required_fields, Tool, ToolError, ToolOutput, DEFAULT_TOOL_TIMEOUT_SECS};
