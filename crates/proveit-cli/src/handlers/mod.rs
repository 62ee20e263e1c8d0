//! CLI command handlers

pub mod verify;

pub use verify::{handle_verify, normalize_import_dir, verify_collection};
