#![forbid(unsafe_code)]

pub mod anthropic;
pub mod assemble;
pub mod cli;
pub mod commands;
pub mod config;
pub mod defaults;
pub mod error;
pub mod export;
pub mod formats;
pub mod generation;
pub mod logging;
pub mod noop;
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod sanitize;
pub mod score;
pub mod wizard;
