#![allow(unused_assignments)] // thiserror/miette proc macros trigger false positives

pub mod api;
pub mod checks;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod init;
pub mod logging;
pub mod model;
pub mod observer;
pub mod paths;
pub mod preflight;
pub mod report;
pub mod util;
