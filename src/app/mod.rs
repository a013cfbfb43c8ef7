pub mod cli;
mod context;
pub mod gather;
pub mod submission;

pub use context::AppContext;
