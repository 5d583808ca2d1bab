//! ANSI color codes for CLI listings (`cryptran types`, `cryptran targets`).
//!
//! - Blue: class and member names
//! - Green: resolved types
//! - Dim: inference origin and punctuation
//! - Reset: return to default

/// ANSI palette. Only standard 16-color codes, readable on light and dark
/// terminals.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub blue: &'static str,
    pub green: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        blue: "\x1b[34m",
        green: "\x1b[32m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        blue: "",
        green: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.blue.is_empty()
    }

    /// Name in blue.
    pub fn name(&self, text: &str) -> String {
        format!("{}{}{}", self.blue, text, self.reset)
    }

    /// Type in green.
    pub fn ty(&self, text: &str) -> String {
        format!("{}{}{}", self.green, text, self.reset)
    }

    /// Secondary detail, dimmed.
    pub fn note(&self, text: &str) -> String {
        format!("{}{}{}", self.dim, text, self.reset)
    }
}
