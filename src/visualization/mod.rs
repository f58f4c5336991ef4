pub mod render;
pub mod headless;
