//! Integration tests running txbuild against a fake build tool.

#![cfg(unix)]

mod batch_tests;
mod common;
