//! Voice de-identification for PCM waveforms.
//!
//! # Architecture
//!
//! The pipeline processes an audio track in one pass:
//!
//! 1. [`wav::read_samples`]: WAV file -> interleaved PCM16 samples
//! 2. [`VoiceScrambler::scramble`]: samples -> de-identified mono samples
//! 3. [`wav::write_mono`]: samples -> WAV file
//!
//! The scrambler works entirely in the frequency domain: it displaces the
//! spectrum, blends pairs of frequency bands to destroy the fine formant
//! structure that identifies a speaker, and reconstructs a time-domain
//! waveform normalized to the full 16-bit range. The transformation is
//! deterministic and deliberately not invertible.
//!
//! # Example
//!
//! ```
//! use veil_voice::{ScramblerConfig, VoiceScrambler};
//!
//! let scrambler = VoiceScrambler::with_config(ScramblerConfig {
//!     shift_amount: 1050,
//!     band_width: 2000,
//! })
//! .unwrap();
//!
//! let samples = vec![0i16; 16000]; // one second of silence at 16kHz
//! let anonymized = scrambler.scramble(&samples, 1);
//! assert_eq!(anonymized.len(), 16000);
//! ```

mod error;
mod spectral;
pub mod wav;

pub use error::VoiceError;
pub use spectral::{ScramblerConfig, VoiceScrambler};
