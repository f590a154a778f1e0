pub mod aggregate;
pub mod config;
pub mod decode;
pub mod error;
pub mod escape;
pub mod export;
pub mod parser;
pub mod record;
pub mod run;
pub mod source;
