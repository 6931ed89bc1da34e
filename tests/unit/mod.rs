pub mod config_tests;
pub mod error_tests;
pub mod expander_tests;
pub mod merger_tests;
pub mod validation_tests;
