pub mod arg_parser;
pub mod encryptor;
