//! Type system module
//!
//! This module holds the Asl types and the checker that assigns them.

pub mod type_def;
pub mod checker;

pub use type_def::{equal_types, is_comparable, is_copyable, Type};
pub use checker::TypeChecker;
