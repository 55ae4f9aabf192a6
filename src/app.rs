//! Application module: exposes the view model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds cursor, panel and theme
//! state.

mod model;

pub use model::*;
