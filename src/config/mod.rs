pub mod loader;
pub mod schema;

pub use loader::{discover, load_from_path, load_from_str, ConfigError};
pub use schema::{EditorConfig, ValidationError, ValidationIssue, CONFIG_FILE_NAME};
