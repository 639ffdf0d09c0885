pub mod compare;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod event;
pub mod indicator;
pub mod input;
pub mod market_data;
pub mod metrics;
pub mod model;
pub mod refresh;
pub mod ui;
pub mod yahoo;
