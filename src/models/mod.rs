pub mod graph;
pub mod mention;
pub mod report;

pub use graph::{
    CoOccurrenceEdge, CombinedEdge, CombinedGraph, CombinedNode, IndexedGraph, Network,
    NodeAttributes, PeriodGraph, PeriodNode,
};
pub use mention::{validate_mentions, EntityType, Mention, RawMention};
pub use report::{AnalysisReport, EdgeRecord, NodeRecord, PeriodSummary};
