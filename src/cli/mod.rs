//! CLI subcommand implementations for the ferreprecio binary.

pub mod batch_cmd;
pub mod doctor;
pub mod search_cmd;
pub mod serve_cmd;
