// src/models/mod.rs
pub mod matching;
pub mod stats;
