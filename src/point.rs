//! ## Points
//!
//! The unit of data the tree ingests. Mirrors the reference implementation's
//! `Object` record (an id, a coordinate vector, and a handful of optional
//! bookkeeping fields) rather than the bare `Point2D`/`Point3D` pairs used
//! by a generic spatial index, since the tree needs to carry a label and an
//! asset path through to the exported graph.

use crate::errors::{BirchError, BirchResult};

/// A single data point ingested into the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Identifier unique within the originating source file, assigned by
    /// the caller (usually a running counter from [`crate::io::reader`]).
    pub id: u64,
    /// Feature vector. Length must equal the owning tree's
    /// [`crate::config::TreeConfig::dimension`].
    pub values: Vec<f64>,
    /// Optional class label, carried through from the input file's label
    /// column when present.
    pub label: Option<String>,
    /// Optional path to the asset (image, document, ...) this point
    /// represents, carried through to the JSON export.
    pub asset_path: Option<String>,
    /// Dotted tree-path string (`"0.3.1.4"`) of the leaf cluster this point
    /// was absorbed into, assigned once the point lands in a leaf. `None`
    /// until the tree has actually placed the point.
    pub path: Option<String>,
}

impl Point {
    /// Builds a point, checking it against `dimension`.
    pub fn new(id: u64, values: Vec<f64>, dimension: usize) -> BirchResult<Self> {
        if values.len() != dimension {
            return Err(BirchError::DimensionMismatch {
                expected: dimension,
                found: values.len(),
            });
        }
        Ok(Point {
            id,
            values,
            label: None,
            asset_path: None,
            path: None,
        })
    }

    /// Attaches a label, returning `self` for chaining.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches an asset path, returning `self` for chaining.
    pub fn with_asset_path(mut self, path: impl Into<String>) -> Self {
        self.asset_path = Some(path.into());
        self
    }

    /// Attaches a tree-path string, returning `self` for chaining. Called by
    /// the tree once the point has been absorbed into a leaf cluster.
    pub fn with_tree_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Number of feature dimensions carried by this point.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Squared Euclidean distance to another point of the same
    /// dimensionality.
    pub fn distance_sq(&self, other: &Point) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Euclidean distance to another point of the same dimensionality.
    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }
}
