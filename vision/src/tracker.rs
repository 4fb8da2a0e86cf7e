use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anonymizer::{Anonymizer, AnonymizerConfig, Method};
use crate::error::VisionError;
use crate::region::Region;

/// Configuration for [`FaceTracker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Fraction of a detection's own size added on each side before
    /// anonymizing (default: 0.4).
    pub margin: f64,
    /// Number of past frames whose regions are kept alive (default: 30).
    pub history_capacity: usize,
    /// Two regions whose top-left corners are closer than this many pixels
    /// are treated as the same face (default: 30.0).
    pub proximity_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            margin: 0.4,
            history_capacity: 30,
            proximity_threshold: 30.0,
        }
    }
}

/// Smooths a per-frame face detector's output across a video.
///
/// Detectors intermittently miss faces they found a frame earlier, for
/// example under occlusion or motion blur. Anonymizing only the fresh
/// detections
/// would make a face flicker in and out of the blur, exposing it for single
/// frames. The tracker therefore keeps a bounded history of recent regions
/// and re-anonymizes any of them that the current frame failed to re-detect.
///
/// # Algorithm
///
/// Per frame:
///
/// 1. Expand each fresh detection by the margin, clamp it to the frame,
///    anonymize it, and record it as the frame's current set.
/// 2. Walk the history oldest to newest; anonymize every recorded region
///    with no current-set member nearby (corner distance below the
///    proximity threshold).
/// 3. Append the current set to the history, evicting the oldest frame at
///    capacity.
///
/// The proximity check only suppresses duplicate anonymization of a
/// re-detected face; it does not associate identities across frames.
///
/// State is scoped to one video: frames must be fed in temporal order, and
/// concurrent videos each need their own tracker.
pub struct FaceTracker {
    anonymizer: Anonymizer,
    margin: f64,
    proximity_threshold: f64,
    history: Vec<Vec<Region>>,
    pos: usize,
    filled: usize,
}

impl FaceTracker {
    /// Creates a FaceTracker with default tracking and anonymization
    /// configuration.
    pub fn new() -> Self {
        let cfg = TrackerConfig::default();
        Self {
            anonymizer: Anonymizer::new(),
            margin: cfg.margin,
            proximity_threshold: cfg.proximity_threshold,
            history: vec![Vec::new(); cfg.history_capacity],
            pos: 0,
            filled: 0,
        }
    }

    /// Creates a FaceTracker with the given configuration.
    pub fn with_config(
        cfg: TrackerConfig,
        anonymizer: AnonymizerConfig,
    ) -> Result<Self, VisionError> {
        if cfg.history_capacity == 0 {
            return Err(VisionError::InvalidConfiguration(
                "history capacity must be greater than zero".into(),
            ));
        }
        if !cfg.margin.is_finite() || cfg.margin < 0.0 {
            return Err(VisionError::InvalidConfiguration(format!(
                "margin must be finite and non-negative, got {}",
                cfg.margin
            )));
        }
        if !cfg.proximity_threshold.is_finite() || cfg.proximity_threshold < 0.0 {
            return Err(VisionError::InvalidConfiguration(format!(
                "proximity threshold must be finite and non-negative, got {}",
                cfg.proximity_threshold
            )));
        }
        Ok(Self {
            anonymizer: Anonymizer::with_config(anonymizer)?,
            margin: cfg.margin,
            proximity_threshold: cfg.proximity_threshold,
            history: vec![Vec::new(); cfg.history_capacity],
            pos: 0,
            filled: 0,
        })
    }

    /// Anonymizes one video frame in place.
    ///
    /// `detections` are the external detector's raw boxes for this frame, in
    /// arbitrary order and without margin expansion. Regions a recent frame
    /// recorded that no fresh detection is near are anonymized at their last
    /// known location.
    pub fn process_frame(&mut self, image: &mut RgbImage, detections: &[Region], method: Method) {
        let (frame_width, frame_height) = image.dimensions();

        let mut current = Vec::with_capacity(detections.len());
        for detection in detections {
            let region = detection.expand_and_clamp(self.margin, frame_width, frame_height);
            self.anonymizer.anonymize(image, region, method);
            current.push(region);
        }

        // Re-anonymize recently seen regions the detector lost this frame.
        // History regions were expanded when recorded and are used as-is.
        let capacity = self.history.len();
        let mut revived = 0usize;
        for i in 0..self.filled {
            let idx = (self.pos + capacity - self.filled + i) % capacity;
            for stale in &self.history[idx] {
                let redetected = current
                    .iter()
                    .any(|fresh| fresh.corner_distance(stale) < self.proximity_threshold);
                if !redetected {
                    self.anonymizer.anonymize(image, *stale, method);
                    revived += 1;
                }
            }
        }
        if revived > 0 {
            debug!(revived, fresh = current.len(), "anonymized stale regions");
        }

        self.history[self.pos] = current;
        self.pos = (self.pos + 1) % capacity;
        if self.filled < capacity {
            self.filled += 1;
        }
    }

    /// Number of frames currently recorded in the history.
    pub fn history_len(&self) -> usize {
        self.filled
    }

    /// Clears the detection history, e.g. between videos.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.filled = 0;
        for frame in &mut self.history {
            frame.clear();
        }
    }
}

impl Default for FaceTracker {
    fn default() -> Self {
        Self::new()
    }
}
