use std::fs;

// The shipped defaults are baked into the library with include_str!, so a
// bad value here would only surface at runtime as a silent fallback.
const DEFAULT_CONFIG: &str = "src/default_config.toml";

// <pre><code></code></pre> plus one surrogate pair
const MIN_MESSAGE_LENGTH: i64 = 26;

fn main() {
    println!("cargo:rerun-if-changed={}", DEFAULT_CONFIG);

    let content = fs::read_to_string(DEFAULT_CONFIG)
        .unwrap_or_else(|e| panic!("cannot read {DEFAULT_CONFIG}: {e}"));
    let table = content
        .parse::<toml::Table>()
        .unwrap_or_else(|e| panic!("{DEFAULT_CONFIG} is not valid TOML: {e}"));

    let limit = lookup(&table, "transport", "max_message_length")
        .as_integer()
        .unwrap_or_else(|| panic!("transport.max_message_length must be an integer"));
    if limit < MIN_MESSAGE_LENGTH {
        panic!("transport.max_message_length is {limit}, must be at least {MIN_MESSAGE_LENGTH}");
    }

    for flag in ["tables", "strikethrough", "tasklists"] {
        if lookup(&table, "markdown", flag).as_bool().is_none() {
            panic!("markdown.{flag} must be a boolean");
        }
    }

    if lookup(&table, "logging", "level").as_str().is_none() {
        panic!("logging.level must be a string");
    }
}

fn lookup<'a>(table: &'a toml::Table, section: &str, key: &str) -> &'a toml::Value {
    table
        .get(section)
        .and_then(toml::Value::as_table)
        .and_then(|section| section.get(key))
        .unwrap_or_else(|| panic!("{DEFAULT_CONFIG} is missing {section}.{key}"))
}
