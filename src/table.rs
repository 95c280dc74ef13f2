//! In-memory tables and the gzip-compressed TSV format they are stored in.
use crate::Error;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{Array1, Array2};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Name of the label column every PMLB dataset carries.
pub const TARGET: &str = "target";

/// Cell contents treated as missing, the same set pandas uses by default.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Parsed as a whole number.
    Integer(i64),
    /// Parsed as a floating point number.
    Float(f64),
    /// Anything else that is not a missing marker.
    String(String),
    /// One of the missing-value markers.
    Missing,
}

impl Value {
    /// Interpret a raw field.
    pub fn parse(field: &str) -> Self {
        if MISSING_MARKERS.contains(&field) {
            return Value::Missing;
        }
        if let Ok(i) = field.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = field.parse::<f64>() {
            return Value::Float(f);
        }
        Value::String(field.to_string())
    }

    /// Whether this cell is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell, `NaN` for missing ones.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Missing => Some(f64::NAN),
            Value::String(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing `.0`, so floats read back as floats.
            Value::Float(v) => write!(f, "{v:?}"),
            Value::String(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

/// A dataset: named columns, one of which is usually [`TARGET`].
///
/// Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, checking every row against the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, Error> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::RaggedRow {
                    // header is line 1
                    line: i as u64 + 2,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parse gzip-compressed, tab-separated text with a header line.
    ///
    /// Short records are padded with [`Value::Missing`]; longer ones are an error.
    pub fn from_tsv_gz<R: Read>(reader: R) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(GzDecoder::new(reader));
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(Error::RaggedRow {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            let mut row: Vec<Value> = record.iter().map(Value::parse).collect();
            row.resize(columns.len(), Value::Missing);
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    /// Read a `.tsv.gz` file.
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_tsv_gz(BufReader::new(file))
    }

    /// Serialize as gzip-compressed, tab-separated text, header first, no index.
    pub fn write_tsv_gz<W: Write>(&self, writer: W) -> Result<W, Error> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(GzEncoder::new(writer, Compression::default()));
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
        let encoder = writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        Ok(encoder.finish()?)
    }

    /// Write a `.tsv.gz` file, replacing any existing one.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = self.write_tsv_gz(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }

    /// Column names, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The cells of the column called `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Remove every row that has at least one missing cell. Returns how many went.
    pub fn dropna(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(Value::is_missing));
        before - self.rows.len()
    }

    /// Split into a feature matrix (every column but [`TARGET`], in order) and
    /// the label vector. Missing cells become `NaN`.
    pub fn split_xy(&self) -> Result<(Array2<f64>, Array1<f64>), Error> {
        let target = self.column_index(TARGET).ok_or(Error::MissingTarget)?;
        let n_features = self.columns.len() - 1;

        let mut features = Vec::with_capacity(self.rows.len() * n_features);
        let mut labels = Vec::with_capacity(self.rows.len());
        for (row_index, row) in self.rows.iter().enumerate() {
            for (column, value) in row.iter().enumerate() {
                let number = value.as_f64().ok_or_else(|| Error::NonNumeric {
                    column: self.columns[column].clone(),
                    row: row_index,
                })?;
                if column == target {
                    labels.push(number);
                } else {
                    features.push(number);
                }
            }
        }

        let features = Array2::from_shape_vec((self.rows.len(), n_features), features)?;
        Ok((features, Array1::from_vec(labels)))
    }
}
