//! Error type, result alias and the `verify_arg!`/`verify_data!` checks shared by
//! the sift-* crates.

pub mod error;
pub mod macros;
pub mod result;

pub use result::Result;
