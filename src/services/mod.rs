// src/services/mod.rs

pub mod analytics;
pub mod attempt;
pub mod daily_reset;
pub mod generation;
pub mod llm;
pub mod scoring;
pub mod session;
