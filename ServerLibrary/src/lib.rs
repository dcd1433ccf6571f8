#![allow(non_snake_case)]

pub mod detector;
pub mod management;
pub mod utils;
pub mod web;
