//! CLI command implementations
//!
//! Each submodule contains related command implementations.

mod budgets;
mod centres;
mod core;
mod expenses;
mod reports;
mod serve;
mod users;

pub use budgets::*;
pub use centres::*;
pub use core::*;
pub use expenses::*;
pub use reports::*;
pub use serve::*;
pub use users::*;
