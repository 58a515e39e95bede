pub mod api;
pub mod coach;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod llm;
pub mod llms_txt;
pub mod metrics;
