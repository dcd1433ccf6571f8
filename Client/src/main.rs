#![allow(non_snake_case)]

use std::env;
use std::path::Path;
use std::process::exit;
use ClientLibrary::manager::client::Client;

fn main() {
    let arguments: Vec<String> = env::args().collect();
    if arguments.len() != 2 {
        eprintln!("Usage: Client <image path>");
        exit(1);
    }
    Client::run(Path::new(&arguments[1]));
}
