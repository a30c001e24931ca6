//! Terminal front end: state in [`app`], drawing in [`render`].

pub mod app;
pub mod render;

pub use app::App;
pub use render::render;
