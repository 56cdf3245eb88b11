// src/models/mod.rs

pub mod generation;
pub mod leaderboard;
pub mod profile;
pub mod question;
pub mod quiz;
pub mod reward;
