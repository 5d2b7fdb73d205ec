//! UI helper functions for terminal output formatting.

use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// Reports a guarded action that changed nothing.
pub fn warn_no_effect(err: &mut dyn Write, action: &str, hint: &str) -> std::io::Result<()> {
    display_warning(err, &format!("{} had no effect ({})", action, hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_effect_warning_names_action_and_hint() {
        let mut err = Vec::new();
        warn_no_effect(&mut err, "prestige", "needs 1e12 lifetime chips").unwrap();
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "WARNING: prestige had no effect (needs 1e12 lifetime chips)\n"
        );
    }
}
