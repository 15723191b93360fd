pub mod client;
pub mod config;
pub mod domain;
pub mod execution;
pub mod logging;
pub mod market;
pub mod monitor;
pub mod payoff;
pub mod strategy;
