pub mod config;
pub mod details;
pub mod interactive;
pub mod render;
pub mod search;
pub mod spinner;
