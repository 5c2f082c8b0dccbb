use std::path::PathBuf;

use clap::Parser;

use birchrng::io::reader::{self, LabelPosition, ReaderConfig};
use birchrng::io::{export, layout, splitter};
use birchrng::{BirchResult, FarRepresentativePolicy, RepresentativeConfig, RngConfig, Tree, TreeConfig};

/// Builds a clustering-feature tree with an attached relative neighbourhood
/// graph over one or more feature files, then exports the result as a
/// navigable JSON graph.
#[derive(Parser, Debug)]
#[command(name = "birchrng", version, about)]
struct Cli {
    /// Feature files to ingest, in order. Point identifiers are assigned a
    /// running counter across every file in the batch.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the tree export, leaf-chain artifact, and any split-out
    /// files are written to. Created if it does not already exist.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Dimensionality every input point must match.
    #[arg(long)]
    dimension: usize,

    /// Absorption threshold: a leaf cluster may absorb a new point only if
    /// doing so keeps its diameter at or below this value.
    #[arg(long, default_value_t = 1.0)]
    threshold: f64,

    /// Maximum entries an internal node may hold before it must split.
    #[arg(long, default_value_t = 50)]
    internal_node_max_entries: usize,

    /// Maximum entries a leaf node may hold before it must split.
    #[arg(long, default_value_t = 50)]
    leaf_node_max_entries: usize,

    /// Soft ceiling, in leaf entries, before a memory-ceiling rebuild
    /// triggers. Zero disables the ceiling.
    #[arg(long, default_value_t = 0)]
    max_memory_entries: usize,

    /// Maximum near (and, separately, far) representatives kept per entry.
    #[arg(long, default_value_t = 7)]
    max_representatives: usize,

    /// Far-representative selection policy for leaf clusters.
    #[arg(long, value_enum, default_value_t = FarPolicyArg::Reverse)]
    far_policy: FarPolicyArg,

    /// Relative epsilon inflation applied to the incremental RNG's search
    /// radius.
    #[arg(long, default_value_t = 1.0)]
    irng_epsilon: f64,

    /// Above this many candidates, incremental RNG candidate gathering
    /// switches to the half-radius cutoff.
    #[arg(long, default_value_t = 100)]
    candidate_cutoff: usize,

    /// Bounded hop order used by the incremental RNG's edge-revocation walk.
    #[arg(long, default_value_t = 4)]
    revocation_order: u8,

    /// Point count above which a cluster switches from the batch RNG
    /// algorithm to the incremental one.
    #[arg(long, default_value_t = 10_000)]
    incremental_minimum_objects: usize,

    /// Field separator used in the input files.
    #[arg(long, default_value_t = ',')]
    separator: char,

    /// Where, if anywhere, a label column sits on each input line.
    #[arg(long, value_enum, default_value_t = LabelPositionArg::None)]
    label_position: LabelPositionArg,

    /// Whether each input line carries a trailing separator after its last
    /// field.
    #[arg(long, default_value_t = false)]
    trailing_separator: bool,

    /// Byte threshold above which a node's children are split out to their
    /// own file.
    #[arg(long, default_value_t = splitter::DEFAULT_SPLIT_THRESHOLD_BYTES)]
    split_threshold_bytes: usize,

    /// Skip the stress-majorization layout pass, leaving the exporter's
    /// default grid positions in place.
    #[arg(long, default_value_t = false)]
    no_layout: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FarPolicyArg {
    Reverse,
    Cure,
}

impl From<FarPolicyArg> for FarRepresentativePolicy {
    fn from(policy: FarPolicyArg) -> Self {
        match policy {
            FarPolicyArg::Reverse => FarRepresentativePolicy::Reverse,
            FarPolicyArg::Cure => FarRepresentativePolicy::Cure,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LabelPositionArg {
    None,
    First,
    Last,
}

impl From<LabelPositionArg> for LabelPosition {
    fn from(position: LabelPositionArg) -> Self {
        match position {
            LabelPositionArg::None => LabelPosition::None,
            LabelPositionArg::First => LabelPosition::First,
            LabelPositionArg::Last => LabelPosition::Last,
        }
    }
}

fn main() {
    if let Err(err) = run() {
        tracing::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> BirchResult<()> {
    let cli = Cli::parse();

    let config = TreeConfig {
        dimension: cli.dimension,
        internal_node_max_entries: cli.internal_node_max_entries,
        leaf_node_max_entries: cli.leaf_node_max_entries,
        threshold: cli.threshold,
        max_memory_entries: cli.max_memory_entries,
        representatives: RepresentativeConfig {
            max_representatives: cli.max_representatives,
            far_policy: cli.far_policy.into(),
        },
        rng: RngConfig {
            search_radius_epsilon: cli.irng_epsilon,
            candidate_cutoff: cli.candidate_cutoff,
            revocation_order: cli.revocation_order,
            incremental_minimum_objects: cli.incremental_minimum_objects,
        },
    };

    let reader_config = ReaderConfig {
        separator: cli.separator,
        label: cli.label_position.into(),
        trailing_separator: cli.trailing_separator,
    };

    let mut tree = Tree::new(config);
    let mut next_id: u64 = 0;

    // Each file is read in full, then ingested as a sequence of
    // single-point insertions, preserving the ordering guarantee that the
    // core only ever sees one point at a time. If a later file fails, every
    // point already absorbed from earlier files is kept.
    for input in &cli.inputs {
        let points = reader::read_points(input, &reader_config, &mut next_id)?;
        tree.insert_all(points)?;
    }

    tracing::info!(points = tree.len(), height = tree.height(), "tree built");

    std::fs::create_dir_all(&cli.output_dir)?;

    let mut graph = export::export_tree(&tree);
    if !cli.no_layout {
        layout::layout(&mut graph.payload.nodes, &graph.payload.edges);
    }
    splitter::split_large_children(&mut graph.payload.nodes, &cli.output_dir, cli.split_threshold_bytes)?;

    let serialized = serde_json::to_string_pretty(&graph)?;
    std::fs::write(cli.output_dir.join("tree.json"), serialized)?;
    export::write_leaf_chain_json(&tree, cli.output_dir.join("leaf_chain.json"))?;

    Ok(())
}
