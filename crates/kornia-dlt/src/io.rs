use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::error::DltError;
use crate::projection::ProjectionMatrix;
use crate::{PixelPoint, WorldPoint};

/// Error types for the correspondence tables and the projection matrix files.
#[derive(Debug, thiserror::Error)]
pub enum DltIoError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// A field is not a number
    #[error("Parse error at line {line}: {message}")]
    ParseError {
        /// One-based line number.
        line: usize,
        /// Description of the failure.
        message: String,
    },

    /// A row has the wrong number of fields
    #[error("Invalid number of fields at line {line}: expected {expected}, found {found}")]
    ColumnCount {
        /// One-based line number.
        line: usize,
        /// Expected number of fields.
        expected: usize,
        /// Number of fields found.
        found: usize,
    },

    /// The two tables do not describe the same correspondences
    #[error(transparent)]
    Shape(#[from] DltError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary encoding error
    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// Binary decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Split a table row into numeric fields.
///
/// Fields are separated by whitespace and/or commas. Returns `None` for blank
/// lines and `#` comments.
fn parse_fields(line_no: usize, line: &str) -> Option<Result<Vec<f64>, DltIoError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|e| DltIoError::ParseError {
                line: line_no,
                message: format!("{}: {}", s, e),
            })
        })
        .collect::<Result<Vec<_>, _>>();

    Some(fields)
}

fn parse_pixel_row(line_no: usize, fields: Vec<f64>) -> Result<PixelPoint, DltIoError> {
    // extra columns are ignored, only (u, v) are used
    match fields.as_slice() {
        [u, v, ..] => Ok([*u, *v]),
        _ => Err(DltIoError::ColumnCount {
            line: line_no,
            expected: 2,
            found: fields.len(),
        }),
    }
}

fn parse_world_row(line_no: usize, fields: Vec<f64>) -> Result<WorldPoint, DltIoError> {
    let found = fields.len();
    let point: WorldPoint = fields.try_into().map_err(|_| DltIoError::ColumnCount {
        line: line_no,
        expected: 4,
        found,
    })?;
    if point[3] != 1.0 {
        return Err(DltIoError::ParseError {
            line: line_no,
            message: format!("homogeneous coordinate must be 1, found {}", point[3]),
        });
    }
    Ok(point)
}

fn parse_table<T>(
    lines: impl Iterator<Item = Result<String, std::io::Error>>,
    parse_row: fn(usize, Vec<f64>) -> Result<T, DltIoError>,
) -> Result<Vec<T>, DltIoError> {
    lines
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(line) => parse_fields(i + 1, &line)
                .map(|fields| fields.and_then(|fields| parse_row(i + 1, fields))),
            Err(e) => Some(Err(DltIoError::from(e))),
        })
        .collect()
}

/// Parse the pixel correspondence table.
///
/// Each row holds the pixel coordinates `u v` in its first two fields.
pub fn parse_pixel_table(contents: &str) -> Result<Vec<PixelPoint>, DltIoError> {
    parse_table(contents.lines().map(|l| Ok(l.to_string())), parse_pixel_row)
}

/// Parse the world correspondence table.
///
/// Each row holds the homogeneous world coordinates `x y z 1`.
pub fn parse_world_table(contents: &str) -> Result<Vec<WorldPoint>, DltIoError> {
    parse_table(contents.lines().map(|l| Ok(l.to_string())), parse_world_row)
}

/// Read the pixel correspondence table from a text file.
///
/// # Arguments
///
/// * `path` - The path to the table.
pub fn read_pixel_table(path: impl AsRef<Path>) -> Result<Vec<PixelPoint>, DltIoError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    parse_table(reader.lines(), parse_pixel_row)
}

/// Read the world correspondence table from a text file.
///
/// # Arguments
///
/// * `path` - The path to the table.
pub fn read_world_table(path: impl AsRef<Path>) -> Result<Vec<WorldPoint>, DltIoError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    parse_table(reader.lines(), parse_world_row)
}

/// Read both correspondence tables and check that they are row-aligned.
///
/// # Arguments
///
/// * `pixel_path` - The path to the pixel table.
/// * `world_path` - The path to the world table.
///
/// # Returns
///
/// The pixel points and the world points, index-aligned.
pub fn read_correspondences(
    pixel_path: impl AsRef<Path>,
    world_path: impl AsRef<Path>,
) -> Result<(Vec<PixelPoint>, Vec<WorldPoint>), DltIoError> {
    let pixels = read_pixel_table(pixel_path)?;
    let world = read_world_table(world_path)?;

    if pixels.len() != world.len() {
        return Err(DltError::MismatchedCorrespondences {
            pixels: pixels.len(),
            world: world.len(),
        }
        .into());
    }

    log::debug!("read {} correspondences", pixels.len());

    Ok((pixels, world))
}

/// Write the projection matrix to a JSON file.
pub fn write_projection_json(
    path: impl AsRef<Path>,
    projection: &ProjectionMatrix,
) -> Result<(), DltIoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, projection)?;
    writer.flush()?;
    Ok(())
}

/// Read a projection matrix from a JSON file.
pub fn read_projection_json(path: impl AsRef<Path>) -> Result<ProjectionMatrix, DltIoError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Encode the projection matrix into a compact binary buffer.
pub fn encode_projection(projection: &ProjectionMatrix) -> Result<Vec<u8>, DltIoError> {
    Ok(bincode::encode_to_vec(*projection, bincode::config::standard())?)
}

/// Decode a projection matrix from a binary buffer.
pub fn decode_projection(buffer: &[u8]) -> Result<ProjectionMatrix, DltIoError> {
    let (projection, _) = bincode::decode_from_slice(buffer, bincode::config::standard())?;
    Ok(projection)
}
