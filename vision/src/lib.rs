//! Face-region anonymization for images and video frames.
//!
//! # Architecture
//!
//! The pipeline processes each frame in two layers:
//!
//! 1. [`Anonymizer::anonymize`]: destructively replaces one rectangular
//!    region with a pixelated or Gaussian-blurred rendition
//! 2. [`FaceTracker::process_frame`]: expands and clamps the external
//!    detector's boxes, anonymizes them, and re-anonymizes recently seen
//!    regions the detector lost this frame
//!
//! The tracker exists because per-frame detectors flicker: a face missed
//! for even a single frame would otherwise be exposed. Regions from the
//! last [`TrackerConfig::history_capacity`] frames stay anonymized at
//! their last known location unless a fresh detection lands nearby.
//!
//! # Example
//!
//! ```
//! use veil_vision::{FaceTracker, Method, Region};
//!
//! let mut tracker = FaceTracker::new();
//! let mut frame = image::RgbImage::new(640, 480);
//!
//! // Boxes from an external face detector, raw and unexpanded.
//! let detections = [Region::new(200, 120, 80, 100)];
//! tracker.process_frame(&mut frame, &detections, Method::Pixelate);
//! ```
//!
//! Detection backends plug in behind the [`FaceDetector`] trait; the crate
//! itself never invokes a model.

mod anonymizer;
mod detector;
mod error;
mod region;
mod tracker;

pub use anonymizer::{Anonymizer, AnonymizerConfig, Method};
pub use detector::FaceDetector;
pub use error::VisionError;
pub use region::Region;
pub use tracker::{FaceTracker, TrackerConfig};
