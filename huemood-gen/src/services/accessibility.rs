//! WCAG contrast assessment
//!
//! Pure functions over validated hex colors. The palette-level report is
//! driven by the mean contrast ratio across every unordered color pair.
//!
//! **Thresholds on the mean ratio (strictly greater than):**
//! - contrast: High > 4.5, Medium > 3
//! - readability: Excellent > 7, Good > 4.5
//! - WCAG normal text: AAA > 7, AA > 4.5
//! - WCAG large text: AAA > 4.5, AA > 3
//!
//! Color blindness is reported as a fixed "Moderate"; it is not computed.

use crate::models::{
    AccessibilityReport, ContrastLevel, HexColor, Readability, WcagCompliance, WcagTier,
};

/// Placeholder value reported for color blindness
pub const COLOR_BLINDNESS_PLACEHOLDER: &str = "Moderate";

/// sRGB channel (0-255) to linear light
fn linearize(channel: u8) -> f64 {
    let v = f64::from(channel) / 255.0;
    if v <= 0.03928 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance in [0, 1]
pub fn relative_luminance(color: &HexColor) -> f64 {
    let rgb = color.rgb();
    0.2126 * linearize(rgb.r) + 0.7152 * linearize(rgb.g) + 0.0722 * linearize(rgb.b)
}

/// Contrast ratio in [1, 21]; symmetric in its arguments
pub fn contrast_ratio(a: &HexColor, b: &HexColor) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
}

/// Mean contrast ratio over all C(n,2) pairs
///
/// Fewer than two colors have no pairs and score 1.0 (no contrast).
pub fn average_contrast(colors: &[HexColor]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;

    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            total += contrast_ratio(a, b);
            pairs += 1;
        }
    }

    if pairs == 0 {
        1.0
    } else {
        total / pairs as f64
    }
}

/// Classify a mean contrast ratio
pub fn classify(average: f64) -> AccessibilityReport {
    let contrast = if average > 4.5 {
        ContrastLevel::High
    } else if average > 3.0 {
        ContrastLevel::Medium
    } else {
        ContrastLevel::Low
    };

    let readability = if average > 7.0 {
        Readability::Excellent
    } else if average > 4.5 {
        Readability::Good
    } else {
        Readability::Fair
    };

    let normal = if average > 7.0 {
        WcagTier::AAA
    } else if average > 4.5 {
        WcagTier::AA
    } else {
        WcagTier::BelowAA
    };

    let large = if average > 4.5 {
        WcagTier::AAA
    } else if average > 3.0 {
        WcagTier::AA
    } else {
        WcagTier::BelowAA
    };

    AccessibilityReport {
        contrast,
        color_blindness: COLOR_BLINDNESS_PLACEHOLDER.to_string(),
        readability,
        wcag: WcagCompliance { normal, large },
    }
}

/// Accessibility report for a palette's colors
pub fn assess_palette(colors: &[HexColor]) -> AccessibilityReport {
    classify(average_contrast(colors))
}
