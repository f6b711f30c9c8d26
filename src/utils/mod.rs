pub mod names;
pub mod paths;
pub mod slug;

pub use names::{UniqueNames, sanitize_filename, split_extension};
pub use paths::{normalize_member_name, validate_entry_name};
pub use slug::{DEFAULT_MAX_SLUG_LEN, FALLBACK_SLUG, slugify};
