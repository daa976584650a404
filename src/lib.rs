pub mod config;
pub mod error;
pub mod fetch;
pub mod notation;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod table;
