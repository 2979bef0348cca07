pub mod cli_completion_sink;
pub mod content_forwarder;
pub mod events;
pub mod present_content;
