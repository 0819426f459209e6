//! Binary entry point for `redo-fs`.

use std::process;

fn main() {
    if let Err(e) = redo_fs::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
