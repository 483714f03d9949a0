//! Test utilities for the merge orchestrator
//!
//! Fixtures are written into temporary directories; Shift-JIS files are
//! produced with the `encoding_rs` encoder.

use crate::Result;
use crate::app::models::TargetField;
use crate::app::services::column_mapper::{ColumnResolver, MappingRequest, Resolution};
use encoding_rs::SHIFT_JIS;
use std::fs;
use std::path::Path;


/// Write a UTF-8 fixture
pub fn write_utf8(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Write a Shift-JIS fixture
pub fn write_shift_jis(dir: &Path, name: &str, content: &str) {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(content);
    assert!(!had_errors);
    fs::write(dir.join(name), bytes).unwrap();
}

/// Resolver that replays canned resolutions and records what it saw
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    pub resolutions: Vec<Resolution>,
    pub continue_answers: Vec<bool>,
    pub seen_files: Vec<String>,
    pub seen_encodings: Vec<String>,
    pub suggestion_counts: Vec<usize>,
    pub interrupt_on: Option<String>,
}

impl ColumnResolver for ScriptedResolver {
    fn resolve(
        &mut self,
        request: &MappingRequest<'_>,
        _fields: &[TargetField],
    ) -> Result<Resolution> {
        if self.interrupt_on.as_deref() == Some(request.file_name) {
            return Err(crate::Error::processing_interrupted("test interrupt"));
        }
        self.seen_files.push(request.file_name.to_string());
        self.seen_encodings.push(request.encoding.to_string());
        self.suggestion_counts.push(request.suggestions.iter().count());
        Ok(self.resolutions.remove(0))
    }

    fn continue_after(&mut self, _file_name: &str) -> Result<bool> {
        if self.continue_answers.is_empty() {
            Ok(true)
        } else {
            Ok(self.continue_answers.remove(0))
        }
    }
}
