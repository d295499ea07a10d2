//! Project domain module.
//!
//! A project is the website virtual persons are generated for.

mod model;

pub use model::Project;
