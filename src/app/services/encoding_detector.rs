//! Encoding detection for source CSV files
//!
//! Japanese open-data CSVs arrive as UTF-8 (with or without BOM) or as a
//! Shift-JIS family encoding, and are frequently mislabelled. Detection
//! inspects a bounded prefix of the file: a byte order mark wins outright,
//! then the statistical detector (when enabled), then an ordered list of
//! candidate encodings tried against the first line. When nothing decodes
//! cleanly the detector degrades to UTF-8 and the reader substitutes
//! replacement characters.

use crate::config::ProcessingConfig;
use crate::constants::{CANDIDATE_ENCODINGS, FALLBACK_ENCODING};
use crate::{Error, Result};
use encoding_rs::{DecoderResult, EUC_JP, Encoding, SHIFT_JIS, UTF_8};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// How an encoding was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    ByteOrderMark,
    Statistical,
    Candidate,
    Fallback,
}

/// Result of encoding detection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedEncoding {
    /// Lower-cased encoding name reported to the operator
    pub name: String,
    pub encoding: &'static Encoding,
    pub source: DetectionSource,
}

impl DetectedEncoding {
    fn new(name: impl Into<String>, encoding: &'static Encoding, source: DetectionSource) -> Self {
        Self {
            name: name.into(),
            encoding,
            source,
        }
    }

    /// Final fallback: UTF-8 with replacement decoding downstream
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ENCODING, UTF_8, DetectionSource::Fallback)
    }
}

/// Resolve an encoding name, accepting common Python-style aliases
pub fn resolve_label(name: &str) -> Option<&'static Encoding> {
    let label = name.trim().to_lowercase();
    match label.as_str() {
        "utf-8-sig" | "utf_8_sig" | "utf8" => Some(UTF_8),
        "cp932" | "ms932" | "mskanji" | "shift_jis" | "shift-jis" | "sjis" => Some(SHIFT_JIS),
        "euc_jp" | "eucjp" => Some(EUC_JP),
        _ => Encoding::for_label(label.as_bytes())
            .or_else(|| Encoding::for_label(label.replace('_', "-").as_bytes())),
    }
}

/// Encoding detector with a bounded sample
#[derive(Debug, Clone)]
pub struct EncodingDetector {
    sample_size: usize,
    statistical: bool,
    candidates: Vec<String>,
}

impl EncodingDetector {
    pub fn new(sample_size: usize, statistical: bool) -> Self {
        Self {
            sample_size,
            statistical,
            candidates: CANDIDATE_ENCODINGS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.sample_size, config.statistical_detection)
    }

    /// Replace the ordered candidate list
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Detect the encoding of a file from its leading bytes
    pub fn detect(&self, path: &Path) -> Result<DetectedEncoding> {
        let file = File::open(path)
            .map_err(|e| Error::file_unreadable(path.display().to_string(), e.to_string()))?;

        let file_len = file
            .metadata()
            .map_err(|e| Error::file_unreadable(path.display().to_string(), e.to_string()))?
            .len();

        let mut sample = Vec::with_capacity(self.sample_size.min(1 << 20));
        file.take(self.sample_size as u64)
            .read_to_end(&mut sample)
            .map_err(|e| Error::file_unreadable(path.display().to_string(), e.to_string()))?;

        let truncated = (sample.len() as u64) < file_len;
        let detected = self.detect_sample(&sample, truncated);
        debug!(
            "Detected encoding {} ({:?}) for {}",
            detected.name,
            detected.source,
            path.display()
        );
        Ok(detected)
    }

    /// Detect the encoding of an in-memory sample
    ///
    /// `truncated` signals that the sample ends mid-file, so an incomplete
    /// trailing character is not a decode error.
    pub fn detect_sample(&self, sample: &[u8], truncated: bool) -> DetectedEncoding {
        if let Some(detected) = detect_bom(sample) {
            return detected;
        }

        if self.statistical {
            if let Some(detected) = guess_statistical(sample, truncated) {
                return detected;
            }
        }

        match self.try_candidates(sample, truncated) {
            Ok(detected) => detected,
            Err(e) => {
                warn!("{}; falling back to {}", e, FALLBACK_ENCODING);
                DetectedEncoding::fallback()
            }
        }
    }

    /// Try each candidate encoding against the first line of the sample
    fn try_candidates(&self, sample: &[u8], truncated: bool) -> Result<DetectedEncoding> {
        let (line, complete) = match sample.iter().position(|&b| b == b'\n') {
            Some(end) => (&sample[..=end], true),
            None => (sample, !truncated),
        };

        for name in &self.candidates {
            let Some(encoding) = resolve_label(name) else {
                debug!("Skipping unknown candidate encoding {}", name);
                continue;
            };

            let bytes = if encoding == UTF_8 {
                line.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(line)
            } else {
                line
            };

            if decodes_cleanly(encoding, bytes, complete) {
                return Ok(DetectedEncoding::new(
                    name.to_lowercase(),
                    encoding,
                    DetectionSource::Candidate,
                ));
            }
            debug!("Candidate encoding {} failed on first line", name);
        }

        Err(Error::encoding_undetectable("sample"))
    }
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self::from_config(&ProcessingConfig::default())
    }
}

fn detect_bom(sample: &[u8]) -> Option<DetectedEncoding> {
    let (encoding, _bom_length) = Encoding::for_bom(sample)?;
    let name = if encoding == UTF_8 {
        "utf-8-sig".to_string()
    } else {
        encoding.name().to_lowercase()
    };
    Some(DetectedEncoding::new(
        name,
        encoding,
        DetectionSource::ByteOrderMark,
    ))
}

fn guess_statistical(sample: &[u8], truncated: bool) -> Option<DetectedEncoding> {
    if sample.is_empty() {
        return None;
    }

    // ASCII decodes identically everywhere; report it as UTF-8
    if Encoding::ascii_valid_up_to(sample) == sample.len() {
        return Some(DetectedEncoding::new(
            "utf-8",
            UTF_8,
            DetectionSource::Statistical,
        ));
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(sample, !truncated);
    let encoding = detector.guess(None, true);
    let name = encoding.name().to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some(DetectedEncoding::new(
        name,
        encoding,
        DetectionSource::Statistical,
    ))
}

/// Decode without replacement, reporting whether any malformed sequence was hit
fn decodes_cleanly(encoding: &'static Encoding, bytes: &[u8], last: bool) -> bool {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let Some(capacity) = decoder.max_utf8_buffer_length_without_replacement(bytes.len()) else {
        return false;
    };
    let mut decoded = String::with_capacity(capacity);
    let (result, _read) = decoder.decode_to_string_without_replacement(bytes, &mut decoded, last);
    matches!(result, DecoderResult::InputEmpty)
}
