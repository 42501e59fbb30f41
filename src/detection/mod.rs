//! Per-pixel analysis stages: normalization, classification, change
//! detection and damage quantification.

pub mod preprocessing;
pub mod classify;
pub mod change;
pub mod damage;

pub use change::{detect_changes, hue_distance, ChangeDetection};
pub use classify::{classify, classify_detailed, Classification};
pub use damage::{calculate_damage, class_distribution};
pub use preprocessing::{normalize_pair, HsvImage, NormalizedPair, NormalizedRaster};
