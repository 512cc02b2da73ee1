//! Desktop console for request bins: list bins, create new ones, edit the
//! response each bin serves, and inspect the requests it has captured.

pub mod api;
pub mod app;
pub mod config;
pub mod console;
pub mod error;
pub mod model;
pub mod toast;
pub mod view;

pub use error::{ConsoleError, Result};
