pub mod common_options;
pub mod recipient_parser;
pub mod request_flags;
