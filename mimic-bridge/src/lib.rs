#![doc = include_str!("../../doc_include.md")]

pub mod actuator;
pub mod bridge_config;
pub mod logging;
pub mod session;
