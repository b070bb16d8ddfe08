//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::Parser;
use memcheck::{CheckConfig, TagReusePolicy, WindowConfig};

#[derive(Parser, Debug)]
#[command(name = "memcheck")]
#[command(about = "Check a load-store unit memory trace against a reference RAM model")]
#[command(version)]
pub struct Cli {
    /// Trace log captured from the load-store unit
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// First byte address of the modeled RAM (hex)
    #[arg(long, value_name = "HEX", value_parser = parse_hex_arg, default_value = "20000000")]
    pub ram_base: u32,

    /// Size of the modeled RAM in bytes (hex)
    #[arg(long, value_name = "HEX", value_parser = parse_hex_arg, default_value = "400000")]
    pub ram_size: u32,

    /// Fail when a tag is reissued before its response arrives
    #[arg(long)]
    pub strict_tags: bool,

    /// Show metrics summary after the check
    #[arg(long)]
    pub metrics: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,
}

impl Cli {
    pub const fn config(&self) -> CheckConfig {
        CheckConfig {
            window: WindowConfig {
                base: self.ram_base,
                size: self.ram_size,
            },
            tag_reuse: if self.strict_tags {
                TagReusePolicy::Strict
            } else {
                TagReusePolicy::Permissive
            },
        }
    }
}

fn parse_hex_arg(value: &str) -> Result<u32, String> {
    memcheck_trace::parse_hex(value).ok_or_else(|| format!("invalid hex value `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["memcheck", "lsu.log"]).unwrap();
        assert_eq!(cli.trace, PathBuf::from("lsu.log"));
        assert_eq!(cli.config(), CheckConfig::default());
        assert!(!cli.metrics);
    }

    #[test]
    fn test_window_and_strict() {
        let cli = Cli::try_parse_from([
            "memcheck",
            "--ram-base",
            "0x80000000",
            "--ram-size",
            "1000",
            "--strict-tags",
            "lsu.log",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.window.base, 0x8000_0000);
        assert_eq!(config.window.size, 0x1000);
        assert_eq!(config.tag_reuse, TagReusePolicy::Strict);
    }

    #[test]
    fn test_missing_trace() {
        assert!(Cli::try_parse_from(["memcheck"]).is_err());
    }

    #[test]
    fn test_bad_hex() {
        let parsed = Cli::try_parse_from(["memcheck", "--ram-base", "zz", "lsu.log"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        let parsed = Cli::try_parse_from(["memcheck", "-v", "-s", "lsu.log"]);
        assert!(parsed.is_err());
    }
}
