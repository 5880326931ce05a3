//! Terminal output helpers.

use colored::Colorize;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a success message
pub(crate) fn success(msg: &str) {
    println!("{} {}", "[PASS]".green().bold(), msg);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Formats a rotation as `(x, y, z)` degrees.
pub(crate) fn angles(a: [f64; 3]) -> String {
    format!("({:>4}, {:>4}, {:>4})", a[0], a[1], a[2])
}

/// Pretty JSON to stdout.
pub(crate) fn json<T: serde::Serialize>(value: &T) -> crate::error::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| crate::error::CliError::InvalidFormat(e.to_string()))?;
    println!("{text}");
    Ok(())
}
