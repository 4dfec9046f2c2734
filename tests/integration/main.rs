// Integration tests for settings-picker

mod cli_tests;
mod common;
mod config_tests;
