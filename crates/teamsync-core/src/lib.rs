pub mod catalog;
pub mod config;
pub mod error;
pub mod github;
pub mod io;
pub mod issue;
pub mod paths;
pub mod roster;
pub mod theme;

#[cfg(test)]
mod test_support;

pub use error::{Result, SyncError};
