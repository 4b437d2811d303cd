//! The PM persona's persisted specification document.

mod extract;
mod store;

pub use extract::extract_specification;
pub use store::{FileSpecificationStore, SpecificationStore};
