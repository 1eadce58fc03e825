pub use crate::{
    algorithms::{
        connected_components::{connected_components, ConnectedComponents, COMPONENT},
        page_rank::{page_rank, PageRank, PAGE_RANK},
        sssp::{sssp, SingleSourceShortestPath, DISTANCE},
    },
    compute::{
        context::{ComputeContext, InitContext, MasterComputeContext},
        Bidirectional, Outgoing, PregelComputation,
    },
    config::{PregelConfig, Partitioning},
    custom_pool,
    errors::PregelError,
    messages::{Messages, Reducer},
    node_value::NodeValue,
    pregel::{Pregel, PregelResult},
    progress::{NullProgressTracker, ProgressTracker, TracingProgressTracker},
    schema::{PregelSchema, Value, ValueType, Visibility},
    termination::TerminationFlag,
};
pub use pregel_api::{graph::Graph, VID};
