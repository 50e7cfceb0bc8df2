/// Application-wide constants to avoid magic values throughout the codebase.
///
/// This module centralizes the literal values shared across modules:
/// output formats, file layout conventions, tool defaults and the
/// scoring reference table.
/// Output format constants
pub mod output_formats {
    /// Text output format - colorful table per page
    pub const TEXT: &str = "text";
    /// JSON output format - structured report for automation
    pub const JSON: &str = "json";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 2] = [TEXT, JSON];
}

/// On-disk layout of release directories
pub mod layout {
    /// Prefix of release directory names, followed by the release number
    pub const RELEASE_PREFIX: &str = "release-";
    /// Summary file written by the testing tool, relative to a page folder
    pub const SUMMARY_FILE: &str = "data/browsertime.summary-total.json";
    /// Top-level entries of a page folder kept after pruning
    pub const RETAINED_ARTIFACTS: [&str; 1] = ["data"];
    /// Folder under the base directory the tool writes into before relocation
    pub const STAGING_DIR: &str = ".staging";
    /// Config file name looked up in the start directory and its parents
    pub const CONFIG_FILE: &str = ".vitalsup.toml";
    /// How many parent directories are searched for a config file
    pub const CONFIG_SEARCH_DEPTH: usize = 3;
}

/// External testing tool defaults
pub mod tool {
    /// Program invoked for each page
    pub const COMMAND: &str = "sitespeed.io";
    /// Placeholder replaced with the page URL in tool arguments
    pub const URL_PLACEHOLDER: &str = "{url}";
    /// Placeholder replaced with the staging output folder in tool arguments
    pub const OUTPUT_PLACEHOLDER: &str = "{output}";
    /// Default argument template
    pub const ARGS: [&str; 5] = ["{url}", "--outputFolder", "{output}", "-n", "3"];
    /// Default timeout for one tool run, in seconds
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 1800;
    /// Largest accepted timeout, in seconds (24 hours)
    pub const MAX_TIMEOUT_SECONDS: u64 = 86_400;
    /// Maximum bytes of tool stderr kept for diagnostics
    pub const STDERR_CAPTURE_LIMIT: usize = 4096;
    /// How long stderr is still read after the tool exits, in milliseconds
    pub const STDERR_DRAIN_GRACE_MILLIS: u64 = 500;
}

/// Log-normal scoring reference points and aggregate weights
pub mod scoring {
    /// (median, poor, weight) for First Contentful Paint
    pub const FCP: (f64, f64, f64) = (1800.0, 3000.0, 0.10);
    /// (median, poor, weight) for Largest Contentful Paint
    pub const LCP: (f64, f64, f64) = (2500.0, 4000.0, 0.25);
    /// (median, poor, weight) for Total Blocking Time
    pub const TBT: (f64, f64, f64) = (300.0, 600.0, 0.30);
    /// (median, poor, weight) for Cumulative Layout Shift
    pub const CLS: (f64, f64, f64) = (0.1, 0.25, 0.15);
    /// (median, poor, weight) for Time To First Byte
    pub const TTFB: (f64, f64, f64) = (800.0, 1800.0, 0.20);

    /// Scores at or above this are rendered as "good"
    pub const GOOD_THRESHOLD: u8 = 90;
    /// Scores at or above this are rendered as "needs improvement"
    pub const NEEDS_IMPROVEMENT_THRESHOLD: u8 = 50;
}

/// Display and formatting constants
pub mod display {
    /// Placeholder for a missing metric value
    pub const MISSING_VALUE: &str = "–";
    /// Placeholder for an undefined percentage or an absent score
    pub const NOT_APPLICABLE: &str = "n/a";
    /// Default dashboard title
    pub const DEFAULT_TITLE: &str = "Web Vitals Release Comparison";
    /// Emoji for success status
    pub const SUCCESS_EMOJI: &str = "✅";
    /// Emoji for warnings
    pub const WARNING_EMOJI: &str = "⚠️";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_formats_constants() {
        assert_eq!(output_formats::TEXT, "text");
        assert_eq!(output_formats::JSON, "json");
        assert_eq!(output_formats::DEFAULT, "text");
        assert_eq!(output_formats::ALL.len(), 2);
    }

    #[test]
    fn test_scoring_weights_sum_to_one() {
        let total = scoring::FCP.2 + scoring::LCP.2 + scoring::TBT.2 + scoring::CLS.2 + scoring::TTFB.2;
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_poor_is_above_median() {
        for (median, poor, _) in [
            scoring::FCP,
            scoring::LCP,
            scoring::TBT,
            scoring::CLS,
            scoring::TTFB,
        ] {
            assert!(poor > median);
        }
    }

    #[test]
    fn test_default_tool_args_use_placeholders() {
        assert!(tool::ARGS.contains(&tool::URL_PLACEHOLDER));
        assert!(tool::ARGS.contains(&tool::OUTPUT_PLACEHOLDER));
    }
}
