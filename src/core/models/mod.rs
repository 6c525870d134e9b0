pub mod draft;
pub mod recipient;
pub mod request;
