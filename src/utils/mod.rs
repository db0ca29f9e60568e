//! Small shared helpers.

pub mod collate;
pub mod fmt;

pub use collate::compare_ci;
pub use fmt::fmt_short;
