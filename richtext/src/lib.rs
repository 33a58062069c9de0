//! Internal API of the `richtext` command, exposed for integration tests.
pub mod batch;
pub mod cli;
pub mod process;
