//! Named visual style presets and operator-answer normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed visual parameters backing one preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub muted_text: &'static str,
    pub accent: &'static str,
    pub accent_secondary: &'static str,
    pub border: &'static str,
    pub shadow: &'static str,
}

/// The closed set of selectable UI styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    /// Light, airy, restrained accents. The fallback preset.
    #[default]
    Minimal,
    /// Near-black surfaces with neon accents.
    Dark,
    /// Translucent glassmorphism over a gradient.
    Glass,
    /// Material-style elevation and bold accent.
    Material,
    /// Warm illustrated look.
    Illustrated,
}

impl StylePreset {
    /// All presets in their lettered answer order (a–e).
    pub const ALL: [Self; 5] = [
        Self::Minimal,
        Self::Dark,
        Self::Glass,
        Self::Material,
        Self::Illustrated,
    ];

    /// Normalizes a free-text operator answer to a preset.
    ///
    /// A single letter a–e selects positionally; otherwise the first preset
    /// whose name occurs in the answer wins; anything else falls back to
    /// [`StylePreset::Minimal`].
    #[must_use]
    pub fn normalize(answer: &str) -> Self {
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        let lowered = trimmed.to_lowercase();
        if lowered.len() == 1 {
            match lowered.as_str() {
                "a" => return Self::Minimal,
                "b" => return Self::Dark,
                "c" => return Self::Glass,
                "d" => return Self::Material,
                "e" => return Self::Illustrated,
                _ => {}
            }
        }

        for preset in Self::ALL {
            if lowered.contains(&preset.to_string()) {
                return preset;
            }
        }

        Self::default()
    }

    /// Returns the fixed palette for this preset.
    #[must_use]
    pub fn palette(&self) -> Palette {
        match self {
            Self::Minimal => Palette {
                background: "#f6f7fb",
                surface: "#ffffff",
                card: "#ffffff",
                text: "#1e2235",
                muted_text: "#5f6274",
                accent: "#2563eb",
                accent_secondary: "#93c5fd",
                border: "rgba(15, 23, 42, 0.08)",
                shadow: "0 25px 55px rgba(15,23,42,0.18)",
            },
            Self::Dark => Palette {
                background: "#05060b",
                surface: "#0f172a",
                card: "#111827",
                text: "#f8fafc",
                muted_text: "#9ca3af",
                accent: "#38bdf8",
                accent_secondary: "#6366f1",
                border: "rgba(148,163,184,0.2)",
                shadow: "0 30px 60px rgba(0,0,0,0.45)",
            },
            Self::Glass => Palette {
                background: "linear-gradient(135deg, #a1c4fd 0%, #c2e9fb 100%)",
                surface: "rgba(255,255,255,0.15)",
                card: "rgba(255,255,255,0.35)",
                text: "#0f172a",
                muted_text: "#1f2937",
                accent: "#ec4899",
                accent_secondary: "#8b5cf6",
                border: "rgba(255,255,255,0.45)",
                shadow: "0 25px 55px rgba(31,41,55,0.25)",
            },
            Self::Material => Palette {
                background: "#eceff1",
                surface: "#fefefe",
                card: "#ffffff",
                text: "#101828",
                muted_text: "#475467",
                accent: "#ff7a18",
                accent_secondary: "#ffb347",
                border: "rgba(16,24,40,0.08)",
                shadow: "0 25px 50px rgba(15,23,42,0.15)",
            },
            Self::Illustrated => Palette {
                background: "#fdf5e6",
                surface: "#fff8e1",
                card: "#ffffff",
                text: "#2f1c46",
                muted_text: "#6a4c93",
                accent: "#ff6b6b",
                accent_secondary: "#ffa36c",
                border: "rgba(106, 76, 147, 0.2)",
                shadow: "0 25px 40px rgba(106,76,147,0.2)",
            },
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimal => write!(f, "minimal"),
            Self::Dark => write!(f, "dark"),
            Self::Glass => write!(f, "glass"),
            Self::Material => write!(f, "material"),
            Self::Illustrated => write!(f, "illustrated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn letters_select_positionally() {
        assert_eq!(StylePreset::normalize("a"), StylePreset::Minimal);
        assert_eq!(StylePreset::normalize("b"), StylePreset::Dark);
        assert_eq!(StylePreset::normalize("C"), StylePreset::Glass);
        assert_eq!(StylePreset::normalize(" d "), StylePreset::Material);
        assert_eq!(StylePreset::normalize("E"), StylePreset::Illustrated);
    }

    #[test]
    fn names_match_by_substring() {
        assert_eq!(StylePreset::normalize("dark please"), StylePreset::Dark);
        assert_eq!(
            StylePreset::normalize("I'd like the Material one"),
            StylePreset::Material
        );
    }

    #[test]
    fn unrecognized_input_falls_back_to_minimal() {
        assert_eq!(StylePreset::normalize("xyz"), StylePreset::Minimal);
        assert_eq!(StylePreset::normalize(""), StylePreset::Minimal);
        assert_eq!(StylePreset::normalize("z"), StylePreset::Minimal);
    }

    #[test]
    fn every_preset_has_a_distinct_accent() {
        let accents: std::collections::HashSet<&str> =
            StylePreset::ALL.iter().map(|p| p.palette().accent).collect();
        assert_eq!(accents.len(), StylePreset::ALL.len());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&StylePreset::Glass).unwrap();
        assert_eq!(json, r#""glass""#);
    }
}
