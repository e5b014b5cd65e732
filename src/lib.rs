// src/lib.rs
pub mod cache;
pub mod comparison;
pub mod config;
pub mod ingest;
pub mod llm;
pub mod matching;
pub mod models;
pub mod report;
pub mod utils;
