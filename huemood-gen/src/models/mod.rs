//! Data models for palette generation

pub mod color;
pub mod palette;
pub mod request;

pub use color::{ColorRole, HexColor, InvalidHexColor, Rgb};
pub use palette::{
    AccessibilityReport, ColorEntry, ColorPsychology, ContrastLevel, Palette, Readability,
    WcagCompliance, WcagTier,
};
pub use request::{GenerationMode, GenerationRequest, PalettesResponse};
