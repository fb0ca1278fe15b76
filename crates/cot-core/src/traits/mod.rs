//! Collaborator trait seams
//!
//! The orchestrator is generic over these three seams: composing the wire
//! payload, building the data package on disk, and delivering the payload
//! over a short-lived outbound connection.

mod connection;
mod message;
mod package;

pub use connection::{Connection, Connector};
pub use message::MessageComposer;
pub use package::DataPackageBuilder;
