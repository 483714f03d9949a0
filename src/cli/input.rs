//! User input utilities for interactive CLI prompts
//!
//! This module provides the terminal side of column mapping: the file
//! preview, per-field column prompts and yes/no confirmations. Everything is
//! generic over the reader and writer so the prompts can be driven from
//! tests without a terminal.

use crate::app::models::{PartialMapping, RawTable, TargetField, format_selection};
use crate::app::services::column_mapper::{
    ColumnResolver, MappingRequest, Resolution, SelectionInput, parse_selection,
};
use crate::constants::{PREVIEW_CELL_WIDTH, SKIP_FILE_KEYWORD};
use crate::{Error, Result};
use colored::*;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use tracing::debug;

/// Read one line; end of input is treated as an interrupt
fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| Error::io("Failed to read user input", e))?;

    if read == 0 {
        return Err(Error::processing_interrupted("input closed"));
    }
    Ok(line)
}

fn flush<W: Write>(output: &mut W) -> Result<()> {
    output
        .flush()
        .map_err(|e| Error::io("Failed to flush stdout", e))
}

/// Ask a yes/no question, re-asking until the answer is understood
pub fn prompt_confirmation<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    default_yes: bool,
) -> Result<bool> {
    let default_text = if default_yes { "Y/n" } else { "y/N" };

    loop {
        write!(output, "{} ({}): ", message, default_text)
            .map_err(|e| Error::io("Failed to write prompt", e))?;
        flush(output)?;

        let answer = read_line(input)?.trim().to_lowercase();
        match answer.as_str() {
            "" => return Ok(default_yes),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please enter 'y' for yes or 'n' for no.")
                .map_err(|e| Error::io("Failed to write prompt", e))?,
        }
    }
}

/// Single-line, width-limited rendering of a cell for the preview
pub fn preview_cell(cell: &str) -> String {
    let single_line: String = cell
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if single_line.chars().count() > PREVIEW_CELL_WIDTH {
        let truncated: String = single_line.chars().take(PREVIEW_CELL_WIDTH).collect();
        format!("{}...", truncated)
    } else {
        single_line
    }
}

/// Column resolver that asks an operator on a terminal
pub struct InteractiveResolver<R, W> {
    input: R,
    output: W,
    preview_rows: usize,
}

impl InteractiveResolver<StdinLock<'static>, Stdout> {
    /// Resolver reading stdin and writing stdout
    pub fn stdio(preview_rows: usize) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), preview_rows)
    }
}

impl<R: BufRead, W: Write> InteractiveResolver<R, W> {
    pub fn new(input: R, output: W, preview_rows: usize) -> Self {
        Self {
            input,
            output,
            preview_rows,
        }
    }

    /// Ask a yes/no question on this resolver's terminal
    pub fn confirm(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        prompt_confirmation(&mut self.input, &mut self.output, message, default_yes)
    }

    /// Hand back the writer (tests inspect what was printed)
    pub fn into_output(self) -> W {
        self.output
    }

    fn show_file(&mut self, request: &MappingRequest<'_>, fields: &[TargetField]) -> io::Result<()> {
        let table = request.table;
        let out = &mut self.output;

        writeln!(out)?;
        writeln!(out, "{}", format!("=== {} ===", request.file_name).bright_green().bold())?;
        writeln!(out, "Encoding: {}", request.encoding.bright_cyan())?;
        writeln!(
            out,
            "Shape: {} rows x {} columns",
            table.row_count(),
            table.column_count()
        )?;

        writeln!(out, "{}", "Columns:".bold())?;
        for (index, header) in table.headers.iter().enumerate() {
            writeln!(
                out,
                "  {} {}",
                format!("[{}]", index).bright_yellow(),
                preview_cell(header)
            )?;
        }

        write_preview(out, table, self.preview_rows)?;

        if !request.suggestions.is_empty() {
            writeln!(out, "{}", "Suggested columns:".bold())?;
            for &field in fields {
                if let Some(columns) = request.suggestions.get(field) {
                    writeln!(out, "  {}: {}", field, format_selection(columns))?;
                }
            }
        }

        writeln!(
            out,
            "{}",
            format!(
                "Enter an index, several joined with '+', blank for the default, or '{}'",
                SKIP_FILE_KEYWORD
            )
            .bright_black()
        )
    }

    /// Ask for one field until the answer parses
    fn ask_field(
        &mut self,
        field: TargetField,
        column_count: usize,
        suggestion: Option<&[usize]>,
    ) -> Result<SelectionInput> {
        let default_text = suggestion
            .map(format_selection)
            .unwrap_or_else(|| "none".to_string());

        loop {
            write!(
                self.output,
                "{} column index(es) [default: {}]: ",
                field, default_text
            )
            .map_err(|e| Error::io("Failed to write prompt", e))?;
            flush(&mut self.output)?;

            let line = read_line(&mut self.input)?;
            match parse_selection(&line, column_count) {
                Ok(selection) => return Ok(selection),
                Err(e) => {
                    debug!("Rejected selection for {}: {}", field, e);
                    writeln!(self.output, "  {}", e.to_string().red())
                        .map_err(|e| Error::io("Failed to write prompt", e))?;
                }
            }
        }
    }
}

fn write_preview<W: Write>(out: &mut W, table: &RawTable, rows: usize) -> io::Result<()> {
    if rows == 0 || table.row_count() == 0 {
        return Ok(());
    }

    writeln!(out, "{}", "Preview:".bold())?;
    for (index, row) in table.rows.iter().take(rows).enumerate() {
        let cells: Vec<String> = row.iter().map(|cell| preview_cell(cell)).collect();
        writeln!(out, "  {}: {}", index, cells.join(" | "))?;
    }
    Ok(())
}

impl<R: BufRead, W: Write> ColumnResolver for InteractiveResolver<R, W> {
    fn resolve(
        &mut self,
        request: &MappingRequest<'_>,
        fields: &[TargetField],
    ) -> Result<Resolution> {
        self.show_file(request, fields)
            .map_err(|e| Error::io("Failed to write file preview", e))?;

        let column_count = request.table.column_count();
        let mut partial = PartialMapping::new();

        for &field in fields {
            let suggestion = request.suggestions.get(field);
            match self.ask_field(field, column_count, suggestion)? {
                SelectionInput::SkipFile => return Ok(Resolution::SkipFile),
                SelectionInput::UseDefault => {
                    if let Some(columns) = suggestion {
                        partial.set(field, columns.to_vec());
                    }
                }
                SelectionInput::Columns(columns) => partial.set(field, columns),
            }
        }

        Ok(Resolution::Mapped(partial.into_mapping()))
    }

    fn continue_after(&mut self, _file_name: &str) -> Result<bool> {
        self.confirm("Continue to next file?", true)
    }
}
