pub mod agent;
pub mod compaction;
pub mod config;
pub mod errors;
pub mod llm;
pub mod message;
pub mod repl;
