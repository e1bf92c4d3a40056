//! The category catalogue: the seeded default categories and the JSON endpoints to read them.

mod core;
mod endpoints;

pub use core::{Category, DEFAULT_CATEGORIES, seed_default_categories};
pub use endpoints::{get_categories, get_category};
