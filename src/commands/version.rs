//! Command: print version information.

/// Version string embedded at build time, falling back to the package
/// version.
#[must_use]
pub fn version_string() -> &'static str {
    option_env!("MYDOT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the mydot version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("mydot {}", version_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_is_not_empty() {
        assert!(!version_string().is_empty());
    }
}
