pub mod accounts;
pub mod aws;
pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod constants;
pub mod report;
