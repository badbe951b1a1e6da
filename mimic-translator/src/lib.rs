#![doc = include_str!("../../doc_include.md")]

pub mod artifacts;
pub mod config;
pub mod geometry;
pub mod joints;
pub mod landmarks;
pub mod pipeline;
pub mod record;
pub mod translator;
pub mod validator;
