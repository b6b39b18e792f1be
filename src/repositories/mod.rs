pub mod magic_link_store;
pub mod user_repository;

pub use magic_link_store::{
    InMemoryMagicLinkStore, MagicLinkStore, SqliteMagicLinkStore, StoreError,
};
pub use user_repository::{RepositoryError, SqliteUserRepository, UserRepository};
