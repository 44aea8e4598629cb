//! Library wrapper around the `nova` CLI implementation.
//!
//! `cargo test -p nova-cli --lib` typechecks the binary crate root (`main.rs`) through this
//! module without building the integration tests.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
