//! In-memory collaborators for exercising the dispatcher without a server.

mod scripted;
mod test_helpers;

pub use scripted::{ScriptHandle, ScriptedConnector, ScriptedDriver, ScriptedResponse};
pub use test_helpers::create_test_row;
