//! Configure, build and package steps.
//!
//! Each step works on a single source tree and returns a
//! [`RecipeError`](crate::core::RecipeError) on failure. Steps never retry.

pub mod assemble;
pub mod configure;
pub mod invoke;
pub mod msvc;
pub mod translate;

pub use assemble::{assemble, Assembly};
pub use configure::configure;
pub use invoke::{build, BuildStrategy};
pub use msvc::EnvOverlay;
pub use translate::{translate, translate_target, ConfigParameter};
