use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EffectError;

/// The closed set of motion effects the engine can render.
///
/// Every constant an effect needs (zoom range, pan distance, drift) is baked
/// into its formula in [`render_frame`](super::render_frame); nothing about an
/// effect is configurable beyond picking the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    ZoomIn,
    ZoomOut,
    FadeIn,
    FadeOut,
    SlideLeft,
    SlideRight,
    PanLeftToRight,
    PanRightToLeft,
    KenBurns,
}

impl Effect {
    /// All effects, in menu order
    pub const ALL: [Effect; 9] = [
        Effect::ZoomIn,
        Effect::ZoomOut,
        Effect::FadeIn,
        Effect::FadeOut,
        Effect::SlideLeft,
        Effect::SlideRight,
        Effect::PanLeftToRight,
        Effect::PanRightToLeft,
        Effect::KenBurns,
    ];

    /// Canonical kebab-case name, as accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Effect::ZoomIn => "zoom-in",
            Effect::ZoomOut => "zoom-out",
            Effect::FadeIn => "fade-in",
            Effect::FadeOut => "fade-out",
            Effect::SlideLeft => "slide-left",
            Effect::SlideRight => "slide-right",
            Effect::PanLeftToRight => "pan-left-to-right",
            Effect::PanRightToLeft => "pan-right-to-left",
            Effect::KenBurns => "ken-burns",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Effect::ZoomIn => "Zoom In",
            Effect::ZoomOut => "Zoom Out",
            Effect::FadeIn => "Fade In",
            Effect::FadeOut => "Fade Out",
            Effect::SlideLeft => "Slide In from Left",
            Effect::SlideRight => "Slide In from Right",
            Effect::PanLeftToRight => "Pan Left to Right",
            Effect::PanRightToLeft => "Pan Right to Left",
            Effect::KenBurns => "Ken Burns Effect",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Effect::ZoomIn => "Push in from 1.0x to 1.5x, centered",
            Effect::ZoomOut => "Pull back from 1.5x to 1.0x, centered",
            Effect::FadeIn => "Rise from black over the first second",
            Effect::FadeOut => "Sink to black over the last second",
            Effect::SlideLeft => "Image enters from the left edge",
            Effect::SlideRight => "Image enters from the right edge",
            Effect::PanLeftToRight => "Drift rightwards across a 1.2x crop",
            Effect::PanRightToLeft => "Drift leftwards across a 1.2x crop",
            Effect::KenBurns => "Slow 1.0x to 1.3x zoom with a diagonal drift",
        }
    }

    /// Name fragment used in output file names (`photo_ken_burns.mp4`)
    pub fn file_slug(&self) -> String {
        self.name().replace('-', "_")
    }

    /// Comma-separated list of canonical names, for error messages and help text
    pub fn available_names() -> String {
        Self::ALL
            .iter()
            .map(|effect| effect.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn lookup(normalized: &str) -> Option<Effect> {
        if let Some(effect) = Self::ALL.iter().find(|e| e.name() == normalized) {
            return Some(*effect);
        }

        // Long menu labels and the short names used by folder scripts
        match normalized {
            "slide-in-from-left" | "slide-from-left" => Some(Effect::SlideLeft),
            "slide-in-from-right" | "slide-from-right" => Some(Effect::SlideRight),
            "pan-right" => Some(Effect::PanRightToLeft),
            "pan-left" => Some(Effect::PanLeftToRight),
            "ken-burns-effect" | "kenburns" => Some(Effect::KenBurns),
            _ => None,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = EffectError;

    /// Parse an effect name, ignoring case and treating `_`, spaces and `-`
    /// as the same separator. Unknown names are an error; there is no
    /// fallback effect.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        Self::lookup(&normalized).ok_or_else(|| EffectError::Unknown {
            name: s.to_string(),
            available: Self::available_names(),
        })
    }
}
