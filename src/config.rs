//! Options shared by [`decode`](crate::decode) and [`encode`](crate::encode).

use crate::warning::WarningSet;

#[cfg(test)]
#[path = "./config_tests.rs"]
mod tests;

/// Revision of the TOML grammar accepted by the decoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Hash)]
pub enum Version {
    /// TOML 1.0.0.
    #[default]
    V1_0,
    /// TOML 1.1.0.
    ///
    /// Adds the `\e` and `\xHH` escapes, lets inline tables span lines,
    /// carry comments and a trailing comma, and allows `HH:MM` times.
    V1_1,
}

impl Version {
    #[inline]
    pub(crate) fn is_v1_1(self) -> bool {
        self == Version::V1_1
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Version::V1_0 => "1.0.0",
            Version::V1_1 => "1.1.0",
        })
    }
}

/// Layout choices made by the encoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodeStyle {
    /// Write hexadecimal digits as `0x1F` rather than `0x1f`.
    pub uppercase_hex: bool,
    /// Put every array element on its own line, indented with tabs.
    pub break_arrays: bool,
    /// Pad keys so that `=` lines up within a run of key/value lines.
    pub align_equals: bool,
    /// Separate table headers from the preceding section with a blank line.
    pub blank_line_before_tables: bool,
}

impl Default for EncodeStyle {
    fn default() -> Self {
        Self {
            uppercase_hex: true,
            break_arrays: false,
            align_equals: false,
            blank_line_before_tables: true,
        }
    }
}

/// Decoder and encoder configuration.
///
/// ```
/// use toml_lattice::{Config, Version, WarningKind};
///
/// let config = Config::new(Version::V1_1).without_warning(WarningKind::MultilineInlineTable);
/// assert!(!config.warnings.contains(WarningKind::MultilineInlineTable));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Grammar revision accepted by the decoder.
    pub version: Version,
    /// Warning categories delivered to the sink.
    pub warnings: WarningSet,
    /// Encoder layout.
    pub style: EncodeStyle,
    /// Maximum nesting of arrays and inline tables.
    pub max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 128;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: Version::default(),
            warnings: WarningSet::all(),
            style: EncodeStyle::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Default configuration for the given grammar revision.
    pub fn new(version: Version) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Replaces the encoder style.
    pub fn with_style(mut self, style: EncodeStyle) -> Self {
        self.style = style;
        self
    }

    /// Stops delivering warnings of `kind`.
    pub fn without_warning(mut self, kind: crate::WarningKind) -> Self {
        self.warnings = self.warnings.without(kind);
        self
    }

    /// Replaces the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
