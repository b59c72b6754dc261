pub mod profile_picture_service;
