pub mod analyze;
pub mod help;
pub mod result;
pub mod theme;

pub use result::CommandResult;
