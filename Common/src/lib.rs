#![allow(non_snake_case)]

pub mod detection;
pub mod utils;
