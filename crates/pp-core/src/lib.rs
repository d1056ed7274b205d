//! Core building blocks for the property plotter
//! 
//! This crate provides the signal/subscription primitive every component
//! boundary is built on, plus the shared style and settings types.

pub mod events;
pub mod settings;
pub mod style;

// Re-export commonly used types
pub use events::{Signal, SubscriptionId};
pub use settings::{BinSpec, PlotterSettings, SettingsError, MAX_BINS};
pub use style::{MarkerSymbol, Palette, Rgb};
