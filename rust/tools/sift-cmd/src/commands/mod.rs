//! Command implementations for sift-cmd

pub mod dump_dict;
pub mod encode;
pub mod invert;
pub mod merge;
pub mod search;
