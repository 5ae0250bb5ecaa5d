//! Source layering.

pub mod service;
