//! Quality presets and client-facing compression modes.

use std::fmt;

// =============================================================================
// Preset
// =============================================================================

/// A Ghostscript `-dPDFSETTINGS` preset.
///
/// Ordered from strongest compression (`Screen`) to highest fidelity (`Printer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// 72 dpi images, smallest output
    Screen,
    /// 150 dpi images, balanced
    Ebook,
    /// 300 dpi images, largest output
    Printer,
}

impl Preset {
    /// The value passed to `-dPDFSETTINGS`.
    pub fn as_setting(&self) -> &'static str {
        match self {
            Preset::Screen => "/screen",
            Preset::Ebook => "/ebook",
            Preset::Printer => "/printer",
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Screen => "screen",
            Preset::Ebook => "ebook",
            Preset::Printer => "printer",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Compression Mode
// =============================================================================

/// Compression mode requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    /// `quality-screen`
    QualityScreen,
    /// `quality-ebook`
    #[default]
    QualityEbook,
    /// `quality-printer`
    QualityPrinter,
    /// `max-1mb`: ebook first, screen if the result is still above 1 MiB
    Max1Mb,
}

impl CompressionMode {
    /// All modes, in the order they are documented.
    pub const ALL: [CompressionMode; 4] = [
        CompressionMode::QualityScreen,
        CompressionMode::QualityEbook,
        CompressionMode::QualityPrinter,
        CompressionMode::Max1Mb,
    ];

    /// Look up a mode by its exact wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == name)
    }

    /// Resolve the optional `mode` form field.
    ///
    /// Missing and unknown values fall back to `quality-ebook`.
    pub fn resolve(value: Option<&str>) -> Self {
        value.and_then(Self::from_name).unwrap_or_default()
    }

    /// The wire name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionMode::QualityScreen => "quality-screen",
            CompressionMode::QualityEbook => "quality-ebook",
            CompressionMode::QualityPrinter => "quality-printer",
            CompressionMode::Max1Mb => "max-1mb",
        }
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
