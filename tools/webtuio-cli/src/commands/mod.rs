pub mod config;
pub mod osc;
pub mod replay;
pub mod stream;
