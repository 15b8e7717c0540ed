/// Core module for report conversion
///
/// This module contains the defect record model, the cppcheck XML parser,
/// occurrence counting, and record filtering.

pub mod aggregate;
pub mod defect;
pub mod error;
pub mod filter;
pub mod parser;
