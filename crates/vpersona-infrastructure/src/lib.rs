//! Infrastructure layer for vpersona: configuration files, persistence
//! adapters and durable image storage.

pub mod json_dir_person_repository;
pub mod local_image_storage;
pub mod paths;
pub mod rest_person_repository;
pub mod storage;

pub use crate::json_dir_person_repository::JsonDirPersonRepository;
pub use crate::local_image_storage::LocalImageStorage;
pub use crate::paths::VpersonaPaths;
pub use crate::rest_person_repository::RestPersonRepository;
pub use crate::storage::{ConfigStorage, SecretStorage};
