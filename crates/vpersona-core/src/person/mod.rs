//! Virtual person domain module.
//!
//! # Module Structure
//!
//! - `model`: the `VirtualPerson` record and its immutable update helpers
//! - `repository`: persistence adapter trait keyed by project and encoded name

mod model;
mod repository;

pub use model::VirtualPerson;
pub use repository::VirtualPersonRepository;
