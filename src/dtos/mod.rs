pub mod profile_picture_dtos;
