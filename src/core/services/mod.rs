pub mod label_service;
pub mod request_builder;
pub mod validator;
