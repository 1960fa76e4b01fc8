//! txbuild-lib: build-variant dispatching for an external build tool.
//!
//! This crate provides the pieces the `txbuild` CLI is assembled from:
//! - `args`: permissive positional command parsing
//! - `dispatch`: the table mapping a command to an ordered list of jobs
//! - `job`: job descriptors, tool flags and artifact names
//! - `execute`: sequential, non-aborting job execution with artifact export
//! - `release_override`: the scoped release-settings file
//! - `tool`: invocation of the external build tool

pub mod args;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod execute;
pub mod job;
pub mod platform;
pub mod release_override;
pub mod tool;
