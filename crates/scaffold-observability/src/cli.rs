//! Per-crate debug flags
//!
//! `--debug-scaffold-compiler` turns on debug output for one crate,
//! `--debug-all` for every crate in [`KNOWN_CRATES`]. The `SCAFFOLD_DEBUG`
//! environment variable takes the same crate names, comma separated.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

const FLAG_PREFIX: &str = "--debug-";
const ALL: &str = "all";

/// Crates with debug output enabled
///
/// # Example
/// ```rust
/// use scaffold_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-scaffold-compiler".to_string()]);
/// assert!(flags.is_enabled("scaffold-compiler"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    enabled: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Collect `--debug-*` arguments, ignoring everything else
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::default();
        for arg in args {
            if let Some(crate_name) = arg.strip_prefix(FLAG_PREFIX) {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Enable one crate, or every known crate for `all`
    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        if crate_name == ALL {
            self.enabled.extend(KNOWN_CRATES.iter().map(|c| c.to_string()));
        } else if !crate_name.is_empty() {
            self.enabled.insert(crate_name.to_string());
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled.contains(crate_name)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled.is_empty()
    }

    pub fn enabled_crates(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    /// `EnvFilter` directives: `debug` for enabled crates, `base_level` for
    /// the rest, e.g. `scaffold-compiler=debug,warn`
    pub fn to_filter_string(&self, base_level: &str) -> String {
        self.enabled
            .iter()
            .map(|crate_name| format!("{}=debug", crate_name))
            .chain(std::iter::once(base_level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Debug flags of the running process: its arguments plus `SCAFFOLD_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var("SCAFFOLD_DEBUG") {
        for crate_name in value.split(',') {
            flags.enable(crate_name);
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(args(&["scaffold", "network.json", "--debug-scaffold-compiler"]));
        assert!(flags.is_enabled("scaffold-compiler"));
        assert!(!flags.is_enabled("scaffold-config"));
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(args(&["--debug-all"]));
        assert_eq!(flags.enabled_crates().collect::<Vec<_>>().len(), KNOWN_CRATES.len());
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string_is_sorted() {
        let flags = CrateDebugFlags::from_args(args(&["--debug-scaffold-config", "--debug-scaffold-compiler"]));
        assert_eq!(
            flags.to_filter_string("warn"),
            "scaffold-compiler=debug,scaffold-config=debug,warn"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }
}
