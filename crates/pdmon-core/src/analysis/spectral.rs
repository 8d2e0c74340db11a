use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::FrequencyBand;

/// Largest magnitude seen so far in a band and the bin frequency it occurred at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandPeak {
    pub frequency_hz: f64,
    pub magnitude: f64,
}

impl BandPeak {
    /// Replaces the peak only when `magnitude` is strictly larger, so among
    /// equal magnitudes the first (lowest-frequency) bin offered is kept.
    #[inline]
    pub fn offer(&mut self, frequency_hz: f64, magnitude: f64) {
        if magnitude > self.magnitude {
            self.frequency_hz = frequency_hz;
            self.magnitude = magnitude;
        }
    }
}

/// Maxima over the analyzed band and the two symptom sub-bands.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpectralPeaks {
    pub dominant: BandPeak,
    pub tremor: BandPeak,
    pub dyskinesia: BandPeak,
}

/// Direct transform evaluated only on bins `1..=k_max`.
///
/// The twiddle table holds `exp(-2πi·m/N)` for `m in 0..N`; bin `k` at sample
/// `n` reads entry `(k·n) mod N`, which keeps the phase exact for long windows.
#[derive(Debug, Clone)]
pub struct SpectralBandExtractor {
    sample_rate_hz: f64,
    window_len: usize,
    max_analysis_hz: f64,
    k_max: usize,
    cos_table: Vec<f64>,
    sin_table: Vec<f64>,
}

impl SpectralBandExtractor {
    pub fn new(sample_rate_hz: f64, window_len: usize, max_analysis_hz: f64) -> Self {
        let k_max = max_bin_index(sample_rate_hz, window_len, max_analysis_hz);
        let (cos_table, sin_table) = if k_max == 0 {
            (Vec::new(), Vec::new())
        } else {
            (0..window_len)
                .map(|m| {
                    let phase = -TAU * m as f64 / window_len as f64;
                    (phase.cos(), phase.sin())
                })
                .unzip()
        };

        Self {
            sample_rate_hz,
            window_len,
            max_analysis_hz,
            k_max,
            cos_table,
            sin_table,
        }
    }

    /// True if this extractor was built for the given parameters.
    pub fn matches(&self, sample_rate_hz: f64, window_len: usize, max_analysis_hz: f64) -> bool {
        self.window_len == window_len
            && self.sample_rate_hz.to_bits() == sample_rate_hz.to_bits()
            && self.max_analysis_hz.to_bits() == max_analysis_hz.to_bits()
    }

    pub fn k_max(&self) -> usize {
        self.k_max
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// `f_k = k·fs/N`
    pub fn bin_frequency(&self, k: usize) -> f64 {
        k as f64 * self.sample_rate_hz / self.window_len as f64
    }

    /// Magnitude of bin `k` over `samples`; zero outside `1..=k_max`.
    pub fn bin_magnitude(&self, samples: &[f64], k: usize) -> f64 {
        if k == 0 || k > self.k_max {
            return 0.0;
        }
        let n_len = self.window_len;
        let mut real = 0.0;
        let mut imag = 0.0;
        for (n, &x) in samples.iter().take(n_len).enumerate() {
            let m = (k * n) % n_len;
            real += x * self.cos_table[m];
            imag += x * self.sin_table[m];
        }
        (real * real + imag * imag).sqrt()
    }

    /// Single pass over the bins, tracking the overall and per-band maxima.
    pub fn extract(
        &self,
        samples: &[f64],
        tremor_band: &FrequencyBand,
        dyskinesia_band: &FrequencyBand,
    ) -> SpectralPeaks {
        debug_assert_eq!(samples.len(), self.window_len);
        let mut peaks = SpectralPeaks::default();

        for k in 1..=self.k_max {
            let frequency = self.bin_frequency(k);
            let magnitude = self.bin_magnitude(samples, k);

            peaks.dominant.offer(frequency, magnitude);
            if tremor_band.contains(frequency) {
                peaks.tremor.offer(frequency, magnitude);
            }
            if dyskinesia_band.contains(frequency) {
                peaks.dyskinesia.offer(frequency, magnitude);
            }
        }

        peaks
    }
}

/// `k_max = min(N/2, floor(max_hz·N/fs))`, zero when the inputs cannot yield a bin.
pub fn max_bin_index(sample_rate_hz: f64, window_len: usize, max_analysis_hz: f64) -> usize {
    if window_len == 0 || sample_rate_hz.is_nan() || sample_rate_hz <= 0.0 {
        return 0;
    }
    let nyquist_bin = window_len / 2;
    let limit = (max_analysis_hz * window_len as f64 / sample_rate_hz).floor();
    if limit.is_nan() {
        return 0;
    }
    limit.clamp(0.0, nyquist_bin as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn tremor() -> FrequencyBand {
        FrequencyBand::closed(3.0, 5.0)
    }

    fn dyskinesia() -> FrequencyBand {
        FrequencyBand::left_open(5.0, 7.0)
    }

    #[test]
    fn nominal_window_evaluates_thirty_bins() {
        assert_eq!(max_bin_index(52.0, 156, 10.0), 30);
        assert_eq!(max_bin_index(8.0, 50, 10.0), 25);
        assert_eq!(max_bin_index(52.0, 1, 10.0), 0);
        assert_eq!(max_bin_index(52.0, 0, 10.0), 0);
        assert_eq!(max_bin_index(0.0, 156, 10.0), 0);
        assert_eq!(max_bin_index(52.0, 156, 0.0), 0);
    }

    #[test]
    fn bin_frequencies_are_multiples_of_resolution() {
        let extractor = SpectralBandExtractor::new(52.0, 156, 10.0);
        assert_relative_eq!(extractor.bin_frequency(12), 4.0, epsilon = 1e-12);
        assert_relative_eq!(extractor.bin_frequency(30), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn pure_tone_lands_on_its_bin() {
        let fs = 52.0;
        let n = 156;
        let samples: Vec<f64> = (0..n)
            .map(|i| 0.5 * (TAU * 4.0 * i as f64 / fs).sin() + 1.0)
            .collect();
        let extractor = SpectralBandExtractor::new(fs, n, 10.0);
        let peaks = extractor.extract(&samples, &tremor(), &dyskinesia());

        assert_relative_eq!(peaks.dominant.frequency_hz, 4.0, epsilon = 1e-9);
        assert_relative_eq!(peaks.dominant.magnitude, 39.0, epsilon = 1e-9);
        assert_eq!(peaks.tremor, peaks.dominant);
        assert_abs_diff_eq!(peaks.dyskinesia.magnitude, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn alternating_sequence_peaks_at_nyquist() {
        let samples: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let extractor = SpectralBandExtractor::new(8.0, 50, 10.0);
        let peaks = extractor.extract(&samples, &tremor(), &dyskinesia());

        assert_relative_eq!(peaks.tremor.frequency_hz, 4.0);
        assert_relative_eq!(peaks.tremor.magnitude, 25.0, epsilon = 1e-9);
        assert_eq!(peaks.dyskinesia, BandPeak::default());
    }

    #[test]
    fn equal_magnitudes_keep_lowest_frequency() {
        let mut peak = BandPeak::default();
        peak.offer(3.0, 10.0);
        peak.offer(4.0, 10.0);
        peak.offer(5.0, 9.0);
        assert_eq!(peak.frequency_hz, 3.0);
        assert_eq!(peak.magnitude, 10.0);

        peak.offer(5.0, 10.000_001);
        assert_eq!(peak.frequency_hz, 5.0);
    }

    #[test]
    fn tones_split_between_sub_bands() {
        let fs = 52.0;
        let n = 156;
        let samples: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / fs;
                (TAU * 4.0 * t).cos() + (TAU * 6.0 * t).cos()
            })
            .collect();
        let extractor = SpectralBandExtractor::new(fs, n, 10.0);
        let peaks = extractor.extract(&samples, &tremor(), &dyskinesia());

        assert_relative_eq!(peaks.tremor.frequency_hz, 4.0, epsilon = 1e-9);
        assert_relative_eq!(peaks.dyskinesia.frequency_hz, 6.0, epsilon = 1e-9);
        assert_relative_eq!(
            peaks.tremor.magnitude,
            peaks.dyskinesia.magnitude,
            epsilon = 1e-9
        );
    }

    #[test]
    fn degenerate_extractor_reports_zeros() {
        let extractor = SpectralBandExtractor::new(52.0, 1, 10.0);
        let peaks = extractor.extract(&[1.0], &tremor(), &dyskinesia());
        assert_eq!(peaks, SpectralPeaks::default());
    }

    #[test]
    fn band_beyond_nyquist_never_matches() {
        let samples: Vec<f64> = (0..156).map(|i| (i as f64 * 0.7).sin()).collect();
        let extractor = SpectralBandExtractor::new(52.0, 156, 10.0);
        let high = FrequencyBand::closed(40.0, 60.0);
        let peaks = extractor.extract(&samples, &high, &high);
        assert_eq!(peaks.tremor, BandPeak::default());
        assert_eq!(peaks.dyskinesia, BandPeak::default());
        assert!(peaks.dominant.magnitude > 0.0);
    }
}
