mod markdown;
mod renderer;
mod state;
mod tabs;
pub mod theme;

pub use renderer::render;
pub use state::AppState;
pub use tabs::{Tab, TabController, TabError};
pub use theme::Theme;
