//! birchrng incrementally builds a height-balanced clustering-feature tree
//! over a stream of points, keeping a relative neighbourhood graph attached
//! to every level and every leaf cluster so the whole structure can be
//! exported and laid out as a navigable graph without re-deriving
//! neighbour relationships from scratch.

pub mod cluster;
pub mod config;
pub mod errors;
pub mod io;
mod logging;
pub mod point;
pub mod representatives;
pub mod rng;
pub mod summary;
pub mod tree;

pub use cluster::Cluster;
pub use config::{FarRepresentativePolicy, RepresentativeConfig, RngConfig, TreeConfig};
pub use errors::{BirchError, BirchResult};
pub use point::Point;
pub use summary::{Dist, Summary};
pub use tree::Tree;
