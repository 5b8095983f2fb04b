//! Infrastructure concerns shared by every binary: process configuration and
//! logging setup.

pub mod config;
pub mod logging;
