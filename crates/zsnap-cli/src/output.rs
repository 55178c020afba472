//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use zsnap_core::Namespace;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print all settings of a namespace
    pub fn print_namespace(&self, ns: &Namespace) {
        match self.format {
            OutputFormat::Human => {
                if ns.is_empty() {
                    println!("No settings in '{}'.", ns.name());
                    return;
                }
                let width = ns.keys().map(str::len).max().unwrap_or(0);
                println!("[{}]", ns.name());
                for (key, value) in ns {
                    println!("  {:width$}  {}", key, value, width = width);
                }
            }
            OutputFormat::Json => {
                println!("{}", namespace_json(ns));
            }
            OutputFormat::Quiet => {
                for (key, value) in ns {
                    println!("{}={}", key, value);
                }
            }
        }
    }

    /// Print a single setting
    pub fn print_value(&self, key: &str, value: &str) {
        match self.format {
            OutputFormat::Human => println!("{} = {}", key, value),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "key": key, "value": value }));
            }
            OutputFormat::Quiet => println!("{}", value),
        }
    }

    /// Print a success message (suppressed in quiet mode)
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "ok": true, "message": message }));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// JSON object of a namespace's settings
pub fn namespace_json(ns: &Namespace) -> serde_json::Value {
    let entries: serde_json::Map<String, serde_json::Value> = ns
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect();
    serde_json::json!({
        "namespace": ns.name(),
        "settings": entries,
    })
}
