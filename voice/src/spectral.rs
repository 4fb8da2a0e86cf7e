use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::VoiceError;

/// Zero-valued complex bin, used when blanking spectrum spans.
const COMPLEX_ZERO: Complex<f64> = Complex::new(0.0, 0.0);

/// Configuration for [`VoiceScrambler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScramblerConfig {
    /// Number of spectrum positions the frequency content is displaced by
    /// (default: 1050). Positive shifts move energy toward higher bins,
    /// negative toward lower.
    pub shift_amount: i64,
    /// Width of one frequency band in spectrum bins (default: 2000). Bands
    /// are blended in consecutive pairs.
    pub band_width: usize,
}

impl Default for ScramblerConfig {
    fn default() -> Self {
        Self {
            shift_amount: 1050,
            band_width: 2000,
        }
    }
}

/// Disguises speaker voice characteristics by reshaping the waveform's
/// frequency spectrum.
///
/// # Algorithm
///
/// 1. Keep only the first channel of multi-channel input
/// 2. Forward DFT over the whole waveform
/// 3. Displace the spectrum by `shift_amount` bins, blanking the span that
///    wrapped around instead of letting it leak back in
/// 4. Average each disjoint pair of consecutive `band_width`-wide bands,
///    writing the blend into both bands; this scrambles the fine spectral
///    structure carrying speaker-identifying formant detail while keeping
///    the coarse energy distribution that carries intelligibility
/// 5. Inverse DFT, keeping the real part; the permuted spectrum is no
///    longer conjugate-symmetric, so the imaginary residue is discarded
/// 6. Rescale the peak to the full 16-bit range
///
/// The output is deliberately not invertible: running the transform again
/// with the opposite shift does not restore the original voice.
///
/// Given identical samples and configuration the output is identical;
/// there is no randomness anywhere in the pipeline.
pub struct VoiceScrambler {
    shift_amount: i64,
    band_width: usize,
}

impl VoiceScrambler {
    /// Creates a VoiceScrambler with default configuration.
    pub fn new() -> Self {
        let cfg = ScramblerConfig::default();
        Self {
            shift_amount: cfg.shift_amount,
            band_width: cfg.band_width,
        }
    }

    /// Creates a VoiceScrambler with the given configuration.
    pub fn with_config(cfg: ScramblerConfig) -> Result<Self, VoiceError> {
        if cfg.band_width == 0 {
            return Err(VoiceError::InvalidBandWidth);
        }
        Ok(Self {
            shift_amount: cfg.shift_amount,
            band_width: cfg.band_width,
        })
    }

    /// Transforms an interleaved PCM16 waveform into a de-identified mono
    /// waveform of the same length in samples per channel.
    ///
    /// `channels` describes the interleaving of `samples`; only channel 0
    /// is kept (zero is treated as mono). Empty and all-zero input pass
    /// through unchanged, and a waveform shorter than one band pair comes
    /// back peak-normalized but spectrally untouched.
    pub fn scramble(&self, samples: &[i16], channels: u16) -> Vec<i16> {
        let mono = first_channel(samples, channels);
        let n = mono.len();
        if n == 0 {
            return Vec::new();
        }

        let mut spectrum: Vec<Complex<f64>> = mono
            .iter()
            .map(|&s| Complex::new(s as f64, 0.0))
            .collect();

        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(n).process(&mut spectrum);

        shift_spectrum(&mut spectrum, self.shift_amount);
        average_band_pairs(&mut spectrum, self.band_width);

        planner.plan_fft_inverse(n).process(&mut spectrum);

        // rustfft leaves the inverse unnormalized; the peak rescale below
        // absorbs the 1/N factor.
        let real: Vec<f64> = spectrum.iter().map(|bin| bin.re).collect();
        normalize_to_i16(&real)
    }
}

impl Default for VoiceScrambler {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts channel 0 from an interleaved buffer. `channels == 0` is
/// treated as mono.
fn first_channel(samples: &[i16], channels: u16) -> Vec<i16> {
    let stride = channels.max(1) as usize;
    if stride == 1 {
        return samples.to_vec();
    }
    samples.iter().step_by(stride).copied().collect()
}

/// Displaces the spectrum by `shift` positions and blanks the span that
/// wrapped around the end.
///
/// A plain circular rotation would fold high-frequency energy into the low
/// bins (and vice versa) in a way that stays intelligible; blanking the
/// wrapped span trades a slice of the frequency range for stronger
/// de-identification.
fn shift_spectrum(spectrum: &mut [Complex<f64>], shift: i64) {
    let n = spectrum.len();
    if n == 0 || shift == 0 {
        return;
    }

    let rotation = shift.rem_euclid(n as i64) as usize;
    spectrum.rotate_right(rotation);

    let span = (shift.unsigned_abs() as usize).min(n);
    if shift.unsigned_abs() as usize > n {
        trace!(shift, n, "shift exceeds spectrum length, blanking everything");
    }
    if shift > 0 {
        spectrum[..span].fill(COMPLEX_ZERO);
    } else {
        spectrum[n - span..].fill(COMPLEX_ZERO);
    }
}

/// Replaces each disjoint pair of consecutive bands with their elementwise
/// average, duplicated into both positions.
///
/// With fewer than two whole bands nothing happens; an odd trailing whole
/// band and any final partial band are left untouched.
fn average_band_pairs(spectrum: &mut [Complex<f64>], band_width: usize) {
    let num_bands = spectrum.len() / band_width;
    if num_bands < 2 {
        debug!(
            len = spectrum.len(),
            band_width, "waveform too short for band blending"
        );
        return;
    }

    for pair in 0..num_bands / 2 {
        let first = 2 * pair * band_width;
        let second = first + band_width;
        for i in 0..band_width {
            let blend = (spectrum[first + i] + spectrum[second + i]) / 2.0;
            spectrum[first + i] = blend;
            spectrum[second + i] = blend;
        }
    }
}

/// Rescales so the peak magnitude maps to `i16::MAX`, truncating toward
/// zero. All-zero input yields all-zero output rather than dividing by the
/// zero peak.
fn normalize_to_i16(samples: &[f64]) -> Vec<i16> {
    let peak = samples.iter().fold(0.0f64, |acc, &s| acc.max(s.abs()));
    if peak == 0.0 {
        return vec![0; samples.len()];
    }
    let scale = i16::MAX as f64 / peak;
    samples.iter().map(|&s| (s * scale) as i16).collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    /// Sine waveform quantized to PCM16.
    fn make_sine(freq_hz: f64, n_samples: usize, sample_rate: usize) -> Vec<i16> {
        (0..n_samples)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (16000.0 * (freq_hz * 2.0 * PI * t).sin()) as i16
            })
            .collect()
    }

    fn bins(values: &[f64]) -> Vec<Complex<f64>> {
        values.iter().map(|&v| Complex::new(v, 0.0)).collect()
    }

    #[test]
    fn zero_band_width_is_rejected() {
        let cfg = ScramblerConfig {
            band_width: 0,
            ..Default::default()
        };
        assert!(matches!(
            VoiceScrambler::with_config(cfg),
            Err(VoiceError::InvalidBandWidth)
        ));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(VoiceScrambler::new().scramble(&[], 1).is_empty());
    }

    #[test]
    fn silence_stays_silent() {
        let out = VoiceScrambler::new().scramble(&[0i16; 4000], 1);
        assert_eq!(out, vec![0i16; 4000]);
    }

    #[test]
    fn output_peaks_at_full_scale() {
        let samples = make_sine(440.0, 8000, 16000);
        let out = VoiceScrambler::new().scramble(&samples, 1);
        assert_eq!(out.len(), 8000);
        let peak = out.iter().map(|&s| (s as i32).abs()).max().unwrap();
        // Truncation may land one step below full scale.
        assert!(peak >= i16::MAX as i32 - 1, "peak {peak} below full scale");
    }

    #[test]
    fn scramble_is_deterministic() {
        let samples = make_sine(440.0, 8000, 16000);
        let scrambler = VoiceScrambler::new();
        assert_eq!(
            scrambler.scramble(&samples, 1),
            scrambler.scramble(&samples, 1)
        );
    }

    #[test]
    fn stereo_keeps_first_channel_only() {
        let left = make_sine(440.0, 4000, 16000);
        let right = make_sine(1200.0, 4000, 16000);
        let interleaved: Vec<i16> = left
            .iter()
            .zip(&right)
            .flat_map(|(&l, &r)| [l, r])
            .collect();

        let scrambler = VoiceScrambler::new();
        assert_eq!(
            scrambler.scramble(&interleaved, 2),
            scrambler.scramble(&left, 1)
        );
    }

    #[test]
    fn zero_channel_count_is_treated_as_mono() {
        let samples = make_sine(440.0, 2000, 16000);
        let scrambler = VoiceScrambler::new();
        assert_eq!(scrambler.scramble(&samples, 0), scrambler.scramble(&samples, 1));
    }

    #[test]
    fn input_shorter_than_a_band_does_not_error() {
        // 500 samples against a 2000-bin band: zero whole bands, blending
        // is a no-op, output is just the normalized waveform.
        let samples = make_sine(440.0, 500, 16000);
        let scrambler = VoiceScrambler::with_config(ScramblerConfig {
            shift_amount: 0,
            band_width: 2000,
        })
        .unwrap();
        let out = scrambler.scramble(&samples, 1);
        assert_eq!(out.len(), 500);
        let peak = out.iter().map(|&s| (s as i32).abs()).max().unwrap();
        assert!(peak >= i16::MAX as i32 - 1, "peak {peak} below full scale");
    }

    #[test]
    fn opposite_shifts_do_not_round_trip() {
        // Two tones in different bands so the pairwise blend has something
        // to destroy.
        let n = 8000;
        let samples: Vec<i16> = (0..n)
            .map(|i| {
                let t = i as f64 / 16000.0;
                let a = (300.0 * 2.0 * PI * t).sin();
                let b = (3100.0 * 2.0 * PI * t).sin();
                (12000.0 * (a + b) / 2.0) as i16
            })
            .collect();

        let forward = VoiceScrambler::with_config(ScramblerConfig {
            shift_amount: 1050,
            band_width: 2000,
        })
        .unwrap();
        let backward = VoiceScrambler::with_config(ScramblerConfig {
            shift_amount: -1050,
            band_width: 2000,
        })
        .unwrap();

        let round_tripped = backward.scramble(&forward.scramble(&samples, 1), 1);
        assert_eq!(round_tripped.len(), samples.len());

        let mismatched = round_tripped
            .iter()
            .zip(&samples)
            .filter(|(a, b)| (**a as i32 - **b as i32).abs() > 256)
            .count();
        assert!(
            mismatched > n / 10,
            "band blending should be lossy, only {mismatched} samples differ"
        );
    }

    #[test]
    fn positive_shift_blanks_leading_bins() {
        let mut spectrum = bins(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        shift_spectrum(&mut spectrum, 3);
        // Rotation brings [5,6,7] to the front, then the wrapped span is
        // blanked: [0,0,0,0,1,2,3,4].
        let expected = bins(&[0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(spectrum, expected);
    }

    #[test]
    fn negative_shift_blanks_trailing_bins() {
        let mut spectrum = bins(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        shift_spectrum(&mut spectrum, -3);
        // [3,4,5,6,7,0,1,2] with the last three bins blanked.
        let expected = bins(&[3.0, 4.0, 5.0, 6.0, 7.0, 0.0, 0.0, 0.0]);
        assert_eq!(spectrum, expected);
    }

    #[test]
    fn oversized_shift_blanks_the_whole_spectrum() {
        let mut spectrum = bins(&[1.0, 2.0, 3.0, 4.0]);
        shift_spectrum(&mut spectrum, 20);
        assert!(spectrum.iter().all(|c| c.norm() == 0.0));

        let mut spectrum = bins(&[1.0, 2.0, 3.0, 4.0]);
        shift_spectrum(&mut spectrum, -20);
        assert!(spectrum.iter().all(|c| c.norm() == 0.0));
    }

    #[test]
    fn band_pairs_are_averaged_into_both_positions() {
        // Eight bins, band width 2: bands [1,1] [3,3] [5,5] [7,7] form two
        // pairs averaging to 2 and 6.
        let mut spectrum = bins(&[1.0, 1.0, 3.0, 3.0, 5.0, 5.0, 7.0, 7.0]);
        average_band_pairs(&mut spectrum, 2);
        let expected = bins(&[2.0, 2.0, 2.0, 2.0, 6.0, 6.0, 6.0, 6.0]);
        assert_eq!(spectrum, expected);
    }

    #[test]
    fn trailing_partial_band_is_untouched() {
        // Nine bins, band width 2: four whole bands pair up, bin 8 is a
        // partial band and must survive verbatim.
        let mut spectrum = bins(&[1.0, 1.0, 3.0, 3.0, 5.0, 5.0, 7.0, 7.0, 9.0]);
        average_band_pairs(&mut spectrum, 2);
        assert_eq!(spectrum[8], Complex::new(9.0, 0.0));
    }

    #[test]
    fn odd_trailing_whole_band_is_untouched() {
        // Three whole bands: (0,1) pair up, band 2 stays.
        let mut spectrum = bins(&[1.0, 1.0, 3.0, 3.0, 9.0, 9.0]);
        average_band_pairs(&mut spectrum, 2);
        let expected = bins(&[2.0, 2.0, 2.0, 2.0, 9.0, 9.0]);
        assert_eq!(spectrum, expected);
    }

    #[test]
    fn full_scale_band_layout() {
        // 8000 bins at width 2000: four whole bands, pairs (0,1) and (2,3).
        let mut spectrum: Vec<Complex<f64>> = (0..8000)
            .map(|i| Complex::new((i / 2000) as f64, 0.0))
            .collect();
        average_band_pairs(&mut spectrum, 2000);
        assert!(spectrum[..4000].iter().all(|c| c.re == 0.5));
        assert!(spectrum[4000..].iter().all(|c| c.re == 2.5));

        // 8500 bins: same four whole bands plus a 500-bin partial band that
        // must survive verbatim.
        let mut spectrum: Vec<Complex<f64>> = (0..8500)
            .map(|i| Complex::new(i as f64, 0.0))
            .collect();
        average_band_pairs(&mut spectrum, 2000);
        for (i, bin) in spectrum[8000..].iter().enumerate() {
            assert_eq!(bin.re, (8000 + i) as f64);
        }
    }

    #[test]
    fn single_band_is_a_no_op() {
        let mut spectrum = bins(&[1.0, 2.0, 3.0]);
        let before = spectrum.clone();
        average_band_pairs(&mut spectrum, 3);
        assert_eq!(spectrum, before);
    }

    #[test]
    fn normalize_truncates_toward_zero() {
        let out = normalize_to_i16(&[0.5, -1.0, 0.25]);
        // Peak 1.0 → scale 32767: [16383.5, -32767, 8191.75] truncated.
        assert_eq!(out, vec![16383, -32767, 8191]);
    }

    #[test]
    fn normalize_of_silence_does_not_divide() {
        assert_eq!(normalize_to_i16(&[0.0, 0.0, 0.0]), vec![0, 0, 0]);
    }
}
