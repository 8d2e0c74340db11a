//! Text telemetry emitted over the serial console.
//!
//! Lines starting with `>` follow the Teleplot `>name:value` convention so a
//! plotter attached to the console can chart the levels live.

use pdmon_core::{DetectionResult, MotionSample};

/// `analysis: f_dom=<centiHz>(centiHz) tremor=<n> dysk=<n> fog=<n>`
pub fn analysis_line(result: &DetectionResult) -> String {
    let levels = result.levels();
    format!(
        "analysis: f_dom={}(centiHz) tremor={} dysk={} fog={}",
        centi_hz(result.dominant_frequency_hz),
        levels.tremor,
        levels.dyskinesia,
        levels.freeze
    )
}

/// The four plot lines for one window.
pub fn plot_lines(result: &DetectionResult) -> [String; 4] {
    let levels = result.levels();
    [
        format!(">tremor:{}", levels.tremor),
        format!(">dysk:{}", levels.dyskinesia),
        format!(">fog:{}", levels.freeze),
        format!(">fdom:{:.2}", result.dominant_frequency_hz),
    ]
}

/// `raw: ax=<mg>mg ay=<mg>mg az=<mg>mg |a|=<mg>mg |g|=<dps>dps`, truncated to integers.
pub fn raw_line(sample: &MotionSample) -> String {
    let magnitudes = sample.magnitudes();
    format!(
        "raw: ax={}mg ay={}mg az={}mg |a|={}mg |g|={}dps",
        milli(sample.accel_g.x),
        milli(sample.accel_g.y),
        milli(sample.accel_g.z),
        milli(magnitudes.accel_g),
        magnitudes.gyro_dps as i64
    )
}

/// Hz to integer centi-Hz, truncated toward zero.
pub fn centi_hz(frequency_hz: f64) -> i64 {
    (frequency_hz * 100.0) as i64
}

fn milli(value: f64) -> i64 {
    (value * 1000.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdmon_core::analysis::{BandPeak, SpectralPeaks};
    use pdmon_core::WindowFeatures;

    fn result() -> DetectionResult {
        DetectionResult {
            dominant_frequency_hz: 4.333_333,
            tremor_score: 72.9,
            dyskinesia_score: 3.2,
            freeze_score: 0.0,
            features: WindowFeatures {
                peaks: SpectralPeaks {
                    dominant: BandPeak {
                        frequency_hz: 4.333_333,
                        magnitude: 36.45,
                    },
                    ..SpectralPeaks::default()
                },
                ..WindowFeatures::default()
            },
            ..DetectionResult::default()
        }
    }

    #[test]
    fn analysis_line_uses_centi_hz_and_levels() {
        assert_eq!(
            analysis_line(&result()),
            "analysis: f_dom=433(centiHz) tremor=72 dysk=3 fog=0"
        );
    }

    #[test]
    fn plot_lines_follow_teleplot_format() {
        assert_eq!(
            plot_lines(&result()),
            [
                ">tremor:72".to_string(),
                ">dysk:3".to_string(),
                ">fog:0".to_string(),
                ">fdom:4.33".to_string(),
            ]
        );
    }

    #[test]
    fn raw_line_truncates_to_milli_units() {
        let sample = MotionSample::from_arrays([0.0, -0.0125, 0.9999], [3.0, 4.0, 0.0]);
        assert_eq!(
            raw_line(&sample),
            "raw: ax=0mg ay=-12mg az=999mg |a|=999mg |g|=5dps"
        );
    }
}
