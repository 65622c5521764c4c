pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod publish;
pub mod record;
pub mod transform;
