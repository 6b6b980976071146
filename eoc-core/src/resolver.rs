//! Expands a terminal command into the ordered list of stages it needs.

use crate::error::CoreError;
use crate::registry::Registry;

const REGISTERED: &[&str] = &["register"];
const ASSEMBLED: &[&str] = &["register", "assemble"];
const VERIFIED: &[&str] = &["register", "assemble", "verify"];
const TRANSPILED: &[&str] = &["register", "assemble", "verify", "transpile"];
const COMPILED: &[&str] = &["register", "assemble", "verify", "transpile", "compile"];
const LINKED: &[&str] = &[
    "register",
    "assemble",
    "verify",
    "transpile",
    "compile",
    "link",
];
const PARSED: &[&str] = &["register", "parse"];

/// Commands that always rebuild their inputs, even when run alone.
const ALWAYS_CHAINED: &[&str] = &["latex", "fmt"];

/// Commands that must run, in order, before `command`.
pub fn prerequisites(command: &str) -> &'static [&'static str] {
    match command {
        "parse" | "assemble" => REGISTERED,
        "verify" | "sodg" | "phi" => ASSEMBLED,
        "resolve" | "transpile" => VERIFIED,
        "compile" => TRANSPILED,
        "link" => COMPILED,
        "dataize" | "test" => LINKED,
        "latex" | "fmt" => PARSED,
        _ => &[],
    }
}

/// Full ordered stage list for `command`, or just `command` when `alone`.
///
/// `latex` and `fmt` ignore `alone`. Every name must be known to the registry.
pub fn resolve(registry: &Registry, command: &str, alone: bool) -> Result<Vec<String>, CoreError> {
    let chain: Vec<&str> = if alone && !ALWAYS_CHAINED.contains(&command) {
        vec![command]
    } else {
        prerequisites(command)
            .iter()
            .copied()
            .chain(std::iter::once(command))
            .collect()
    };
    chain
        .into_iter()
        .map(|name| registry.get(name).map(|descriptor| descriptor.name().to_string()))
        .collect()
}
