pub mod user_repository;
pub mod picture_storage_repo;
