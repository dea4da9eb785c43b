//! paperdesk: browse, filter, and download exam papers from a resource archive API

pub mod browser;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod render;
pub mod tui;

pub use browser::{Outcome, PaperBrowser};
pub use client::{PaperClient, PaperSource};
pub use errors::PaperError;
