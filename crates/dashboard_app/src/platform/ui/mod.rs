pub mod json;
pub mod render;
