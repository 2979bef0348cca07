pub mod content_presented;

pub use content_presented::*;
