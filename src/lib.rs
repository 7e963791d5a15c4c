// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod analysis;
pub mod app;
pub mod app_dirs;
pub mod clipboard;
pub mod config;
pub mod export;
pub mod flow;
pub mod logging;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod store;
pub mod streak;
pub mod tokenizer;
pub mod util;
