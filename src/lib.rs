pub mod cli;
pub mod client;
pub mod core;
pub mod matchers;
