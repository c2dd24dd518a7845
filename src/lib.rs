pub mod aggregate;
pub mod business_hours;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod events;
pub mod figure;
pub mod layers;
pub mod logging;
pub mod server;
pub mod trends;
