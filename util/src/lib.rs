pub mod config;
pub mod markdown;
pub mod state;
pub mod test_report;
