// src/matching/mod.rs
pub mod candidates;
pub mod classify;
pub mod exact;
pub mod manager;
pub mod money;
pub mod processor;
