//! Parse stage: split a sanitised line into a resolved verb and its
//! arguments.

use super::alias::resolve;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub verb: String,
    pub args: Vec<String>,
}

pub fn parse(sanitised: &str) -> ParsedCommand {
    let mut parts = sanitised.split(' ');
    let verb = parts.next().unwrap_or("").to_ascii_lowercase();
    let args = parts.map(str::to_string).collect();
    ParsedCommand {
        verb: resolve(&verb).to_string(),
        args,
    }
}
