pub mod filtered_image;
pub mod health;
pub mod root;
