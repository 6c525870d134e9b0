pub mod tool_config;
