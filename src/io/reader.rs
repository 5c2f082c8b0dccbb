//! ## Feature-file reader
//!
//! Mirrors `LoadData`/`SplitContentAndStore` in the reference implementation:
//! a plain-text file, one point per newline-terminated line, fields
//! separated by a configured character, with an optional label column
//! either leading or trailing each line. Unlike the source, which reads the
//! whole file into one buffer and parses in parallel with OpenMP, this
//! walks the file with a buffered line reader — file parsing is not on any
//! hot path the concurrency model in the crate root singles out.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{BirchError, BirchResult};
use crate::point::Point;

/// Where, if anywhere, a label column sits on each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPosition {
    /// No label column; every field is a coordinate.
    None,
    /// The first field on each line is the label.
    First,
    /// The last field on each line is the label.
    Last,
}

/// Input file format knobs, matching spec.md's "Input file format" entry.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Field separator character.
    pub separator: char,
    /// Label column position, if any.
    pub label: LabelPosition,
    /// Whether each line carries a trailing separator after the last field
    /// (would otherwise be parsed as a spurious empty trailing field).
    pub trailing_separator: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            separator: ',',
            label: LabelPosition::None,
            trailing_separator: false,
        }
    }
}

/// Reads every point in `path`, assigning monotonically increasing ids
/// starting from `*next_id` and advancing it past the last id used — so a
/// caller ingesting several files in a batch can keep point identifiers
/// unique across the whole batch by threading the same counter through each
/// call, in place of the source's single-file, single-call `nbData` output
/// parameter.
pub fn read_points(
    path: impl AsRef<Path>,
    config: &ReaderConfig,
    next_id: &mut u64,
) -> BirchResult<Vec<Point>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| BirchError::InputMissing(path.to_path_buf()))?;
    let reader = BufReader::new(file);

    let mut points = Vec::new();
    let mut dimension: Option<usize> = None;

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let mut fields: Vec<&str> = line.split(config.separator).collect();
        if config.trailing_separator && fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }

        let label = match config.label {
            LabelPosition::None => None,
            LabelPosition::First => Some(fields.remove(0).to_string()),
            LabelPosition::Last => fields.pop().map(|f| f.to_string()),
        };

        let dim = *dimension.get_or_insert(fields.len());
        if fields.len() != dim {
            return Err(BirchError::MalformedRecord {
                line: line_no,
                reason: format!("expected {dim} fields, found {}", fields.len()),
            });
        }

        let mut values = Vec::with_capacity(dim);
        for field in &fields {
            let value: f64 = field.trim().parse().map_err(|_| BirchError::MalformedRecord {
                line: line_no,
                reason: format!("could not parse {field:?} as a number"),
            })?;
            values.push(value);
        }

        let id = *next_id;
        *next_id += 1;
        let mut point = Point::new(id, values, dim)?;
        if let Some(label) = label {
            point = point.with_label(label);
        }
        points.push(point);
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_reads_plain_csv_with_no_label() {
        let file = write_temp("0.0,0.0\n1.0,1.0\n");
        let mut next_id = 0;
        let points = read_points(file.path(), &ReaderConfig::default(), &mut next_id).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].values, vec![0.0, 0.0]);
        assert_eq!(points[1].id, 1);
        assert_eq!(next_id, 2);
    }

    #[test]
    fn test_label_first_column_is_stripped_from_values() {
        let file = write_temp("cat,1.0,2.0\ndog,3.0,4.0\n");
        let config = ReaderConfig {
            label: LabelPosition::First,
            ..ReaderConfig::default()
        };
        let mut next_id = 0;
        let points = read_points(file.path(), &config, &mut next_id).unwrap();
        assert_eq!(points[0].label.as_deref(), Some("cat"));
        assert_eq!(points[0].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_label_last_column_is_stripped_from_values() {
        let file = write_temp("1.0,2.0,cat\n3.0,4.0,dog\n");
        let config = ReaderConfig {
            label: LabelPosition::Last,
            ..ReaderConfig::default()
        };
        let mut next_id = 0;
        let points = read_points(file.path(), &config, &mut next_id).unwrap();
        assert_eq!(points[1].label.as_deref(), Some("dog"));
        assert_eq!(points[1].values, vec![3.0, 4.0]);
    }

    #[test]
    fn test_trailing_separator_is_patched() {
        let file = write_temp("1.0,2.0,\n3.0,4.0,\n");
        let config = ReaderConfig {
            trailing_separator: true,
            ..ReaderConfig::default()
        };
        let mut next_id = 0;
        let points = read_points(file.path(), &config, &mut next_id).unwrap();
        assert_eq!(points[0].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_continues_id_counter_across_calls() {
        let file_a = write_temp("0.0\n1.0\n");
        let file_b = write_temp("2.0\n");
        let mut next_id = 0;
        let mut points = read_points(file_a.path(), &ReaderConfig::default(), &mut next_id).unwrap();
        points.extend(read_points(file_b.path(), &ReaderConfig::default(), &mut next_id).unwrap());
        let ids: Vec<u64> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_missing_file_is_input_missing() {
        let mut next_id = 0;
        let err = read_points("/no/such/file.csv", &ReaderConfig::default(), &mut next_id).unwrap_err();
        assert!(matches!(err, BirchError::InputMissing(_)));
    }

    #[test]
    fn test_ragged_line_is_malformed_record() {
        let file = write_temp("0.0,0.0\n1.0\n");
        let mut next_id = 0;
        let err = read_points(file.path(), &ReaderConfig::default(), &mut next_id).unwrap_err();
        assert!(matches!(err, BirchError::MalformedRecord { line: 2, .. }));
    }
}
