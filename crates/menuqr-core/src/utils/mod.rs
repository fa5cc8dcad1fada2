// Small shared utilities.

pub mod id;
pub mod slug;

pub use id::{generate_id, generate_id_with_length};
pub use slug::slugify;
