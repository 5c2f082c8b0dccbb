//! ## Configuration
//!
//! Every knob in birchrng is fixed at tree-construction time and carried in
//! one of the small, immutable structs in this module. Nothing under
//! [`TreeConfig`] can be mutated after [`crate::tree::Tree::new`] — the
//! reference implementation kept its branching factors and threshold in
//! static globals that any call site could poke; here they are plain fields
//! moved in by value once.

/// How a leaf cluster's far representatives are chosen once its size
/// exceeds the trivial (`n <= 2`) case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarRepresentativePolicy {
    /// Sort all points by descending distance to the medoid and take the
    /// first `K`. Cheap, but can cluster the chosen far points together if
    /// they happen to share a distant neighbourhood.
    Reverse,
    /// CURE-style iterative farthest-point selection: repeatedly pick the
    /// point farthest from the representatives chosen so far, skipping
    /// duplicates. More spread out, costs an extra O(n*K) scan.
    Cure,
}

impl Default for FarRepresentativePolicy {
    fn default() -> Self {
        FarRepresentativePolicy::Reverse
    }
}

/// Knobs controlling representative-point selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepresentativeConfig {
    /// Maximum number of near (and, separately, far) representatives kept
    /// per entry. The reference implementation fixes this at 7.
    pub max_representatives: usize,
    /// Far-representative selection policy for leaf clusters.
    pub far_policy: FarRepresentativePolicy,
}

impl Default for RepresentativeConfig {
    fn default() -> Self {
        RepresentativeConfig {
            max_representatives: 7,
            far_policy: FarRepresentativePolicy::default(),
        }
    }
}

/// Knobs controlling the relative neighbourhood graph engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RngConfig {
    /// Relative epsilon inflation applied to the search radius derived
    /// during incremental insertion, so that points lying almost exactly on
    /// the boundary of the search sphere are not missed due to floating
    /// point error.
    pub search_radius_epsilon: f64,
    /// Above this many points already adjacent to the nearest neighbour,
    /// candidate gathering switches to the half-radius cutoff instead of
    /// scanning the full search radius.
    pub candidate_cutoff: usize,
    /// Bounded hop order used by the edge-revocation walk after a new point
    /// is wired in. The reference implementation's production build uses 4;
    /// a commented-out branch for 5 was never shipped.
    pub revocation_order: u8,
    /// Once a cluster or level holds at least this many points, the
    /// incremental (iRNG) algorithm is used for all further insertions
    /// instead of recomputing the full O(n^3) batch RNG from scratch.
    pub incremental_minimum_objects: usize,
}

impl Default for RngConfig {
    fn default() -> Self {
        RngConfig {
            search_radius_epsilon: 1.0,
            candidate_cutoff: 100,
            revocation_order: 4,
            incremental_minimum_objects: 10_000,
        }
    }
}

/// Immutable, construction-time configuration for a [`crate::tree::Tree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    /// Dimensionality every inserted point must match.
    pub dimension: usize,
    /// Maximum number of entries an internal node may hold before it must
    /// split.
    pub internal_node_max_entries: usize,
    /// Maximum number of entries a leaf node may hold before it must split.
    pub leaf_node_max_entries: usize,
    /// Absorption threshold: a leaf cluster may absorb a new point only if
    /// doing so keeps its diameter at or below this value.
    pub threshold: f64,
    /// Soft ceiling, in number of leaf entries, before [`crate::tree::Tree::maybe_rebuild`]
    /// triggers a threshold-doubling rebuild. Zero disables the ceiling.
    pub max_memory_entries: usize,
    /// Representative-selection configuration.
    pub representatives: RepresentativeConfig,
    /// RNG engine configuration.
    pub rng: RngConfig,
}

impl TreeConfig {
    /// Builds a configuration for the given dimensionality and absorption
    /// threshold, using the reference implementation's defaults for every
    /// other field (`B=50`, `L=50`, `K=7`, no memory ceiling).
    pub fn new(dimension: usize, threshold: f64) -> Self {
        TreeConfig {
            dimension,
            internal_node_max_entries: 50,
            leaf_node_max_entries: 50,
            threshold,
            max_memory_entries: 0,
            representatives: RepresentativeConfig::default(),
            rng: RngConfig::default(),
        }
    }
}
