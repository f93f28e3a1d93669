//! Rendering of combinations as text.
//!
//! The canonical expression of a combination is
//! `coefficient*action(+coefficient*action)*`, terms in registration order,
//! coefficients rounded to four decimals with trailing zeros trimmed down to
//! one decimal:
//!
//! ```text
//! 1.35*G+1.35*G2+1.45*LM71+1.16*LM71_BRK+0.9*W+0.9*T
//! ```
//!
//! Zero terms are left out. The plain format (one expression per line) is
//! also the format of the regression fixtures.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::container::CombinationSink;
use super::{Combination, CombinationSet, CombinationTerm};
use crate::errors::{CalcError, CalcResult};

/// Expression formatting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterOptions {
    /// Decimals kept before trimming trailing zeros
    pub precision: usize,
    /// Term separator
    pub separator: String,
    /// Write `0.0*W` terms instead of leaving them out
    pub include_null_terms: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            precision: 4,
            separator: "+".to_string(),
            include_null_terms: false,
        }
    }
}

/// Output format of generated combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// One expression per line
    #[default]
    Plain,
    /// Solver script, one `newLoadCombination` call per combination
    Script,
    /// `idComb,descomp` table
    Csv,
    /// JSON array of numbered rows
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Plain,
        OutputFormat::Script,
        OutputFormat::Csv,
        OutputFormat::Json,
    ];

    /// File extension used when writing to a directory
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "txt",
            OutputFormat::Script => "py",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// A numbered combination, as stored in result tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationRow {
    #[serde(rename = "idComb")]
    pub id_comb: usize,
    pub name: String,
    /// Expression ("decomposition") of the combination
    pub descomp: String,
}

/// Format a coefficient: `precision` decimals, trailing zeros trimmed,
/// at least one decimal kept.
///
/// # Example
/// ```
/// use combo_core::combinations::writer::format_coefficient;
///
/// assert_eq!(format_coefficient(1.0, 4), "1.0");
/// assert_eq!(format_coefficient(1.35, 4), "1.35");
/// assert_eq!(format_coefficient(1.5 * 0.6, 4), "0.9");
/// assert_eq!(format_coefficient(1.45 * 0.8, 4), "1.16");
/// ```
pub fn format_coefficient(value: f64, precision: usize) -> String {
    let mut text = format!("{:.*}", precision, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').len();
        text.truncate(trimmed);
        if text.ends_with('.') {
            text.push('0');
        }
    } else {
        text.push_str(".0");
    }
    if text == "-0.0" {
        text = "0.0".to_string();
    }
    text
}

/// Join terms into an expression. Non-finite and negative coefficients are
/// written as is; [`CombinationWriter::expression`] rejects them.
pub fn format_expression(terms: &[CombinationTerm], options: &WriterOptions) -> String {
    terms
        .iter()
        .filter(|t| options.include_null_terms || !t.is_null())
        .map(|t| format!("{}*{}", format_coefficient(t.coefficient, options.precision), t.action))
        .collect::<Vec<_>>()
        .join(&options.separator)
}

/// Writes combination sets in the supported output formats.
#[derive(Debug, Clone, Default)]
pub struct CombinationWriter {
    options: WriterOptions,
}

impl CombinationWriter {
    pub fn new(options: WriterOptions) -> Self {
        CombinationWriter { options }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Expression of one combination.
    ///
    /// The `coefficient*action(+coefficient*action)*` grammar has no sign, so
    /// a negative coefficient (from a table with negative factors) is an
    /// `InvalidInput` error rather than a `+-` term.
    pub fn expression(&self, combination: &Combination) -> CalcResult<String> {
        if let Some(term) = combination.terms.iter().find(|t| !t.coefficient.is_finite()) {
            return Err(CalcError::missing_factor(
                term.action.as_str(),
                combination.situation.display_name(),
            ));
        }
        if let Some(term) = combination.terms.iter().find(|t| t.coefficient < 0.0) {
            return Err(CalcError::invalid_input(
                format!("{}.{}", combination.name, term.action),
                term.coefficient.to_string(),
                "Negative coefficients cannot be written as a combination expression",
            ));
        }
        Ok(format_expression(&combination.terms, &self.options))
    }

    /// One expression per line, `\n` terminated
    pub fn write_plain<W: Write>(&self, set: &CombinationSet, out: &mut W) -> CalcResult<()> {
        for combination in set {
            writeln!(out, "{}", self.expression(combination)?).map_err(stream_error)?;
        }
        Ok(())
    }

    /// Script registering each combination with the solver
    pub fn write_solver_script<W: Write>(&self, set: &CombinationSet, out: &mut W) -> CalcResult<()> {
        writeln!(out, "# {} combinations", set.situation).map_err(stream_error)?;
        for combination in set {
            writeln!(
                out,
                "combs.newLoadCombination(\"{}\",\"{}\")",
                combination.name,
                self.expression(combination)?
            )
            .map_err(stream_error)?;
        }
        Ok(())
    }

    /// Rows numbered from `offset` in generation order
    pub fn rows(&self, set: &CombinationSet, offset: usize) -> CalcResult<Vec<CombinationRow>> {
        set.iter()
            .enumerate()
            .map(|(i, combination)| {
                Ok(CombinationRow {
                    id_comb: offset + i,
                    name: combination.name.clone(),
                    descomp: self.expression(combination)?,
                })
            })
            .collect()
    }

    /// `idComb,descomp` table
    pub fn write_csv<W: Write>(&self, set: &CombinationSet, offset: usize, out: &mut W) -> CalcResult<()> {
        writeln!(out, "idComb,descomp").map_err(stream_error)?;
        for row in self.rows(set, offset)? {
            writeln!(out, "{},{}", row.id_comb, csv_field(&row.descomp)).map_err(stream_error)?;
        }
        Ok(())
    }

    /// JSON array of rows
    pub fn write_json<W: Write>(&self, set: &CombinationSet, offset: usize, out: &mut W) -> CalcResult<()> {
        let rows = self.rows(set, offset)?;
        serde_json::to_writer_pretty(&mut *out, &rows).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;
        writeln!(out).map_err(stream_error)
    }

    /// Render a set in the given format
    pub fn render(&self, set: &CombinationSet, format: OutputFormat, offset: usize) -> CalcResult<String> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Plain => self.write_plain(set, &mut buffer)?,
            OutputFormat::Script => self.write_solver_script(set, &mut buffer)?,
            OutputFormat::Csv => self.write_csv(set, offset, &mut buffer)?,
            OutputFormat::Json => self.write_json(set, offset, &mut buffer)?,
        }
        String::from_utf8(buffer).map_err(|e| CalcError::Internal { message: e.to_string() })
    }

    /// Hand every combination of a set to a solver-side container
    pub fn insert_into<S: CombinationSink + ?Sized>(&self, set: &CombinationSet, sink: &mut S) -> CalcResult<()> {
        for combination in set {
            sink.new_load_combination(&combination.name, &self.expression(combination)?)?;
        }
        Ok(())
    }
}

fn stream_error(e: std::io::Error) -> CalcError {
    CalcError::file_error("write", "<stream>", e.to_string())
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
