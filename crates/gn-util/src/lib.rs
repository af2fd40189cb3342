//! Miscellaneous support code used by `gn-rust-project`.

pub mod paths;
