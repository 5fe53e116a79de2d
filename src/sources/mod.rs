//! Library sources.
//!
//! A source materializes the library's tree into a working directory,
//! either by cloning a git tag or by copying a local checkout.

pub mod git;
pub mod path;
pub mod source;

pub use git::GitSource;
pub use path::PathSource;
pub use source::Source;
