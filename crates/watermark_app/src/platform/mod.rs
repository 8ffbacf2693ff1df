mod app;
mod effects;
mod prompt;
mod render;

pub use app::run_app;
