#![allow(dead_code)]

mod harness;
pub use harness::*;

mod actions_tests;
mod shutdown_tests;
