//! Vision-model client for plate and violation extraction.
//!
//! Provides the Gemini REST wrapper, the model-agnostic [`VisionModel`]
//! seam, reply parsing, and the [`ExtractionClient`] that turns any
//! failure into a manual-entry placeholder result.

pub mod api;
pub mod config;
pub mod extractor;
pub mod image;
pub mod model;
pub mod parse;
pub mod prompt;

pub use api::{GeminiApi, VisionApiError};
pub use config::GeminiConfig;
pub use extractor::{ExtractionClient, ExtractionFailure, ViolationAnalyzer};
pub use image::InlineImage;
pub use model::VisionModel;
