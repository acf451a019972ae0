pub mod analysis;
pub mod assembler;
pub mod centrality;
pub mod community;
pub mod cooccurrence;
pub mod layout;
pub mod merger;

pub use analysis::{analyze_mentions, AnalysisService, NetworkAnalysis, PeriodAnalysis};
pub use centrality::{compute_centrality, CentralityScores};
pub use community::{detect_consensus, ConsensusPartition};
pub use cooccurrence::{build_edges, group_by_period};
pub use layout::{place_period, spring_layout, Embedding, LayoutPosition};
pub use merger::merge_period_graphs;
