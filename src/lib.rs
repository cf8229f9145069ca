pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod reference;
pub mod table;
pub mod util;
