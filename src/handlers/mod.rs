// src/handlers/mod.rs

pub mod admin;
pub mod generation;
pub mod leaderboard;
pub mod profile;
pub mod quiz;
pub mod rewards;
