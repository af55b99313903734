#![allow(non_snake_case)]

pub mod config;
pub mod engine;
pub mod ui;
