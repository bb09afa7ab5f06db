//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_authority_repository;
mod postgres_authority_repository;

pub use in_memory_authority_repository::InMemoryAuthorityRepository;
pub use postgres_authority_repository::PostgresAuthorityRepository;
