pub mod camera;
pub mod config;
pub mod control;
pub mod pipeline;
pub mod pose;
pub mod render;
pub mod stream;
