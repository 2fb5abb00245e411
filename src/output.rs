//! Console messages. Every line carries a plain-text `INFO:`, `WARN:` or
//! `ERROR:` prefix so the output stays greppable with colors disabled.

use colored::*;
use std::fmt::Display;

use crate::config::{AUTHOR, PRODUCT};

pub fn banner() {
    println!("{} by {}", PRODUCT.bold(), AUTHOR);
}

pub fn info(message: impl Display) {
    println!("{} {}", "INFO:".green(), message);
}

pub fn warn(message: impl Display) {
    println!("{} {}", "WARN:".yellow().bold(), message);
}

pub fn error(message: impl Display) {
    println!("{} {}", "ERROR:".red().bold(), message);
}
