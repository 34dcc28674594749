pub mod config;
pub mod extract;
pub mod info;
pub mod peaks;
pub mod pipeline;
pub mod process;
