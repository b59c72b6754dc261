pub mod profile_picture_handlers;
