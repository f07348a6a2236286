// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Phantom-typed runtime IDs and the container label.

mod id;
mod label;

pub use id::{ContainerId, Id, ImageId};
pub use label::{Label, LabelError};
