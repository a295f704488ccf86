//! HTML templates and styling for the web interface.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and theme definitions
//! - `components` - Shared HTML components (nav bar, toast, page scripts, base template)
//! - `chat` - Chat sidebar, chat view, and composer
//! - `content` - Content detail page and login form

mod chat;
mod components;
mod content;
mod styles;

pub use chat::{chat_sidebar, chat_view, composer, content_grid};
pub use components::{app_layout, base_html, nav_bar, toast_html, PageContext};
pub use content::{content_view, login_page};
pub use styles::STYLE;
