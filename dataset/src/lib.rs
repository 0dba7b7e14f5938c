pub mod demo;
pub mod fetch;
pub mod render;
