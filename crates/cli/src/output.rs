//! JSON-lines output on stdout.

#![allow(clippy::print_stdout)]

use serde::Serialize;

/// Print one JSON document per line.
pub fn print_lines<T: Serialize>(items: &[T]) -> Result<(), serde_json::Error> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

/// Print a single JSON document.
pub fn print_one<T: Serialize + ?Sized>(item: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(item)?);
    Ok(())
}

/// Print a raw line.
pub fn print_raw(line: &str) {
    println!("{line}");
}
