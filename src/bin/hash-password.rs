//! Print a bcrypt hash for the admin password, ready for `.env`.

use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let password = match env::args().nth(1) {
        Some(p) if p.len() >= 8 => p,
        Some(_) => {
            eprintln!("Admin password must be at least 8 characters long");
            std::process::exit(1);
        }
        None => {
            eprintln!("Usage: cargo run --bin hash-password <PASSWORD>");
            std::process::exit(1);
        }
    };

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => {
            println!("\nCost : {}", DEFAULT_COST);
            println!("Hash : {}\n", hashed);
            println!("# Paste this into your .env for the admin console login:");
            println!("ADMIN_HASH_PASSWORD={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
