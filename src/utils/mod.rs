pub mod content_type;
pub mod temp_path;
pub mod validation;
