pub mod handlers;
pub mod index;
pub mod render;

pub use handlers::{AppState, router};
pub use index::{IndexError, MAX_MATCHES, PrefixIndex};
pub use render::{not_found, render_definition};
