#![allow(non_snake_case)]

pub mod manager;
pub mod utils;
