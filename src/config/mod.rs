//! Run configuration: explicit option structs and the JSON config file.

/// JSON-backed animation config.
pub mod file;
/// Save, encode and run options.
pub mod options;
