use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use pdmon_core::MotionSample;

use crate::errors::{ReplayError, Result};
use crate::imu::{RawScale, RAW_BLOCK_LEN};
use crate::types::{ImuSample, InputConfig, InputFormat};

const COLUMNS: usize = 7;
const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(19);

/// Parser for recorded IMU sessions
#[derive(Debug, Clone)]
pub struct ImuParser {
    format: InputFormat,
    scale: RawScale,
    /// Spacing assigned to register dump blocks, which carry no timestamps
    sample_period: Duration,
}

impl Default for ImuParser {
    fn default() -> Self {
        Self {
            format: InputFormat::default(),
            scale: RawScale::default(),
            sample_period: DEFAULT_SAMPLE_PERIOD,
        }
    }
}

impl ImuParser {
    pub fn new(input: &InputConfig) -> Self {
        Self {
            format: input.format,
            scale: input.scale,
            ..Self::default()
        }
    }

    pub fn with_sample_period(mut self, period: Duration) -> Self {
        self.sample_period = period;
        self
    }

    /// Parse IMU samples from a session file
    ///
    /// Expected CSV format:
    /// timestamp_seconds,ax,ay,az,gx,gy,gz
    ///
    /// Sensor columns are in g and dps, or signed 16-bit counts when the
    /// input format is raw. A row with an empty, unreadable or non-finite
    /// sensor field is kept as a failed read. A register dump is read as
    /// binary instead, see [`ImuParser::parse_register_dump`].
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ImuSample>> {
        let file = File::open(path.as_ref())
            .map_err(|_| ReplayError::ImuFileNotFound(path.as_ref().display().to_string()))?;
        match self.format {
            InputFormat::RegisterDump => self.parse_register_dump(file),
            InputFormat::Physical | InputFormat::Raw => self.parse_reader(file),
        }
    }

    /// Parse back-to-back 12-byte burst reads of the output registers.
    ///
    /// Block `n` is stamped `n * sample_period`. A trailing partial block
    /// means the capture was cut short and is rejected.
    pub fn parse_register_dump<R: Read>(&self, mut reader: R) -> Result<Vec<ImuSample>> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let blocks = bytes.chunks_exact(RAW_BLOCK_LEN);
        let remainder = blocks.remainder().len();
        if remainder != 0 {
            return Err(ReplayError::TruncatedBlock {
                offset: bytes.len() - remainder,
                len: remainder,
            });
        }

        let samples: Vec<ImuSample> = blocks
            .filter_map(|chunk| <&[u8; RAW_BLOCK_LEN]>::try_from(chunk).ok())
            .enumerate()
            .map(|(n, block)| {
                let timestamp = self.sample_period.saturating_mul(n as u32);
                ImuSample::new(timestamp, self.scale.decode_block(block))
            })
            .collect();

        if samples.is_empty() {
            return Err(ReplayError::EmptySession);
        }
        log::info!("Loaded {} IMU samples from register dump", samples.len());
        Ok(samples)
    }

    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<ImuSample>> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut samples: Vec<ImuSample> = Vec::new();
        let mut failed = 0usize;

        for (line_number, result) in reader.records().enumerate() {
            // +1 for header, +1 for 1-based indexing
            let line = line_number + 2;
            let record = result.map_err(|e| ReplayError::ImuFormat {
                line,
                message: format!("CSV error: {}", e),
            })?;

            if record.len() < COLUMNS {
                return Err(ReplayError::ImuFormat {
                    line,
                    message: format!(
                        "Expected at least {} columns, found {}",
                        COLUMNS,
                        record.len()
                    ),
                });
            }

            let timestamp = parse_timestamp(&record[0], line)?;
            if let Some(previous) = samples.last() {
                if timestamp < previous.timestamp {
                    return Err(ReplayError::ImuFormat {
                        line,
                        message: format!(
                            "Timestamp {:.6}s is earlier than the previous row ({:.6}s)",
                            timestamp.as_secs_f64(),
                            previous.timestamp_secs()
                        ),
                    });
                }
            }

            let sample = match self.parse_reading(&record) {
                Some(reading) => ImuSample::new(timestamp, reading),
                None => {
                    log::debug!("line {}: unreadable sensor fields, counted as failed read", line);
                    failed += 1;
                    ImuSample::failed(timestamp)
                }
            };
            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(ReplayError::EmptySession);
        }

        log::info!(
            "Loaded {} IMU samples ({} failed reads) from file",
            samples.len(),
            failed
        );
        Ok(samples)
    }

    fn parse_reading(&self, record: &StringRecord) -> Option<MotionSample> {
        match self.format {
            InputFormat::Physical => {
                let mut values = [0.0f64; 6];
                for (slot, field) in values.iter_mut().zip(record.iter().skip(1)) {
                    *slot = field.parse().ok().filter(|v: &f64| v.is_finite())?;
                }
                Some(MotionSample::from_arrays(
                    [values[0], values[1], values[2]],
                    [values[3], values[4], values[5]],
                ))
            }
            InputFormat::Raw | InputFormat::RegisterDump => {
                let mut counts = [0i16; 6];
                for (slot, field) in counts.iter_mut().zip(record.iter().skip(1)) {
                    *slot = field.parse().ok()?;
                }
                Some(self.scale.from_counts(
                    [counts[0], counts[1], counts[2]],
                    [counts[3], counts[4], counts[5]],
                ))
            }
        }
    }
}

fn parse_timestamp(field: &str, line: usize) -> Result<Duration> {
    let seconds: f64 = field.parse().map_err(|e| ReplayError::ImuFormat {
        line,
        message: format!("Invalid timestamp: {}", e),
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ReplayError::ImuFormat {
            line,
            message: format!("Timestamp must be finite and non-negative, got {}", seconds),
        });
    }
    Ok(Duration::from_secs_f64(seconds))
}
