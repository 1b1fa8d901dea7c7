//! Library wrapper around the `optree` CLI implementation.
//!
//! The binary crate root (`main.rs`) is compiled as a module here so that
//! `cargo test -p optree-cli --lib` typechecks the CLI without building the
//! integration tests.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
