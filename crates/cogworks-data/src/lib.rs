pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, load_layout, parse_layout};
