use image::RgbImage;

use crate::error::VisionError;
use crate::region::Region;

/// Pluggable face detection backend.
///
/// The crate does not ship a detector; orchestrators wrap whatever engine
/// they run (ONNX, rustface, a remote service) behind this trait and feed
/// the result to [`crate::FaceTracker::process_frame`]. Implementations may
/// be stateful, hence `&mut self`.
pub trait FaceDetector: Send {
    /// Detects face bounding boxes in the frame, in arbitrary order.
    ///
    /// Returned boxes are raw detector output: they need not be
    /// margin-expanded and may touch the frame edges. The tracker applies
    /// expansion and clamping.
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Region>, VisionError>;
}
