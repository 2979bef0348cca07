pub mod content_submitted;
pub mod pipeline_failed;
pub mod transcript_extracted;

pub use content_submitted::*;
pub use pipeline_failed::*;
pub use transcript_extracted::*;
