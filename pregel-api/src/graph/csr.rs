use super::{Graph, GraphError, Prop};
use crate::{compute::par_cum_sum, VID};
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Csr {
    // offsets[i]..offsets[i + 1] indexes the targets of node i
    offsets: Vec<usize>,
    targets: Vec<VID>,
    weights: Option<Vec<f64>>,
}

impl Csr {
    fn from_edges(
        node_count: usize,
        edges: &[(VID, VID, Option<f64>)],
        weighted: bool,
    ) -> Self {
        let mut counts = vec![0usize; node_count + 1];
        for (src, _, _) in edges {
            counts[src.index() + 1] += 1;
        }
        par_cum_sum(&mut counts);

        let mut cursor = counts.clone();
        let mut targets = vec![VID(0); edges.len()];
        let mut weights = weighted.then(|| vec![f64::NAN; edges.len()]);
        for (src, dst, weight) in edges {
            let slot = cursor[src.index()];
            cursor[src.index()] += 1;
            targets[slot] = *dst;
            if let (Some(weights), Some(weight)) = (weights.as_mut(), weight) {
                weights[slot] = *weight;
            }
        }

        Self {
            offsets: counts,
            targets,
            weights,
        }
    }

    #[inline]
    fn range(&self, node: VID) -> std::ops::Range<usize> {
        self.offsets[node.index()]..self.offsets[node.index() + 1]
    }

    fn degree(&self, node: VID) -> usize {
        self.range(node).len()
    }

    fn neighbours(&self, node: VID) -> impl Iterator<Item = VID> + '_ {
        self.targets[self.range(node)].iter().copied()
    }
}

#[derive(Debug)]
enum NodeProperty {
    Long(Vec<Option<i64>>),
    Double(Vec<Option<f64>>),
}

#[derive(Debug)]
struct CsrStorage {
    adj: Csr,
    inverse: Option<Csr>,
    original_ids: Vec<u64>,
    id_map: FxHashMap<u64, VID>,
    properties: FxHashMap<String, NodeProperty>,
    is_multi_graph: bool,
}

/// Immutable compressed-sparse-row graph.
///
/// Cloning shares the underlying arrays, so [`Graph::concurrent_copy`] is cheap.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    inner: Arc<CsrStorage>,
}

impl Graph for CsrGraph {
    fn node_count(&self) -> usize {
        self.inner.original_ids.len()
    }

    fn relationship_count(&self) -> usize {
        self.inner.adj.targets.len()
    }

    fn degree(&self, node: VID) -> usize {
        self.inner.adj.degree(node)
    }

    fn neighbours(&self, node: VID) -> impl Iterator<Item = VID> + '_ {
        self.inner.adj.neighbours(node)
    }

    fn weighted_neighbours(
        &self,
        node: VID,
        fallback: f64,
    ) -> impl Iterator<Item = (VID, f64)> + '_ {
        let range = self.inner.adj.range(node);
        let weights = self.inner.adj.weights.as_deref();
        range.map(move |slot| {
            let weight = weights
                .map(|w| w[slot])
                .filter(|w| !w.is_nan())
                .unwrap_or(fallback);
            (self.inner.adj.targets[slot], weight)
        })
    }

    fn has_relationship_property(&self) -> bool {
        self.inner.adj.weights.is_some()
    }

    fn is_multi_graph(&self) -> bool {
        self.inner.is_multi_graph
    }

    fn concurrent_copy(&self) -> Self {
        self.clone()
    }

    fn has_inverse_index(&self) -> bool {
        self.inner.inverse.is_some()
    }

    fn inverse_degree(&self, node: VID) -> usize {
        self.inner
            .inverse
            .as_ref()
            .map(|inv| inv.degree(node))
            .unwrap_or(0)
    }

    fn inverse_neighbours(&self, node: VID) -> impl Iterator<Item = VID> + '_ {
        self.inner
            .inverse
            .as_ref()
            .into_iter()
            .flat_map(move |inv| inv.neighbours(node))
    }

    fn node_property(&self, key: &str, node: VID) -> Option<Prop> {
        match self.inner.properties.get(key)? {
            NodeProperty::Long(values) => values.get(node.index()).copied()?.map(Prop::I64),
            NodeProperty::Double(values) => values.get(node.index()).copied()?.map(Prop::F64),
        }
    }

    fn to_original_id(&self, node: VID) -> u64 {
        self.inner.original_ids[node.index()]
    }

    fn to_internal_id(&self, original_id: u64) -> Option<VID> {
        self.inner.id_map.get(&original_id).copied()
    }
}

/// Collects nodes and relationships keyed by original id and freezes them into a [`CsrGraph`].
///
/// Internal ids are assigned densely in order of first appearance.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    original_ids: Vec<u64>,
    id_map: FxHashMap<u64, VID>,
    edges: Vec<(VID, VID, Option<f64>)>,
    weighted: bool,
    inverse_index: bool,
    properties: FxHashMap<String, Vec<(VID, Prop)>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also build the reverse adjacency, needed by bidirectional computations.
    pub fn with_inverse_index(mut self, inverse_index: bool) -> Self {
        self.inverse_index = inverse_index;
        self
    }

    pub fn add_node(&mut self, original_id: u64) -> VID {
        match self.id_map.get(&original_id) {
            Some(vid) => *vid,
            None => {
                let vid = VID(self.original_ids.len());
                self.original_ids.push(original_id);
                self.id_map.insert(original_id, vid);
                vid
            }
        }
    }

    pub fn add_edge(&mut self, src: u64, dst: u64) -> &mut Self {
        let src = self.add_node(src);
        let dst = self.add_node(dst);
        self.edges.push((src, dst, None));
        self
    }

    pub fn add_weighted_edge(&mut self, src: u64, dst: u64, weight: f64) -> &mut Self {
        let src = self.add_node(src);
        let dst = self.add_node(dst);
        self.weighted = true;
        self.edges.push((src, dst, Some(weight)));
        self
    }

    pub fn add_node_property(
        &mut self,
        node: u64,
        key: &str,
        value: impl Into<Prop>,
    ) -> Result<&mut Self, GraphError> {
        let value = value.into();
        let vid = self.add_node(node);
        let values = self.properties.entry(key.to_owned()).or_default();
        if let Some((_, existing)) = values.first() {
            if existing.dtype() != value.dtype() {
                return Err(GraphError::PropertyTypeError {
                    name: key.to_owned(),
                    expected: existing.dtype(),
                    actual: value.dtype(),
                });
            }
        }
        values.push((vid, value));
        Ok(self)
    }

    pub fn build(self) -> CsrGraph {
        let node_count = self.original_ids.len();
        let adj = Csr::from_edges(node_count, &self.edges, self.weighted);

        let inverse = self.inverse_index.then(|| {
            let reversed: Vec<_> = self
                .edges
                .iter()
                .map(|(src, dst, weight)| (*dst, *src, *weight))
                .collect();
            Csr::from_edges(node_count, &reversed, self.weighted)
        });

        let is_multi_graph = (0..node_count).any(|node| {
            let mut targets: Vec<_> = adj.neighbours(VID(node)).collect();
            let len = targets.len();
            targets.sort_unstable();
            targets.dedup();
            targets.len() != len
        });

        let properties = self
            .properties
            .into_iter()
            .filter_map(|(key, values)| {
                let property = match values.first()?.1 {
                    Prop::I64(_) => {
                        let mut column = vec![None; node_count];
                        for (vid, prop) in values {
                            column[vid.index()] = prop.as_i64();
                        }
                        NodeProperty::Long(column)
                    }
                    Prop::F64(_) => {
                        let mut column = vec![None; node_count];
                        for (vid, prop) in values {
                            column[vid.index()] = prop.as_f64();
                        }
                        NodeProperty::Double(column)
                    }
                };
                Some((key, property))
            })
            .collect();

        CsrGraph {
            inner: Arc::new(CsrStorage {
                adj,
                inverse,
                original_ids: self.original_ids,
                id_map: self.id_map,
                properties,
                is_multi_graph,
            }),
        }
    }
}

impl CsrGraph {
    /// Shorthand for an unweighted graph from `(src, dst)` pairs of original ids.
    pub fn from_edges(edges: impl IntoIterator<Item = (u64, u64)>) -> Self {
        let mut builder = GraphBuilder::new();
        for (src, dst) in edges {
            builder.add_edge(src, dst);
        }
        builder.build()
    }

    pub fn internal_id(&self, original_id: u64) -> Result<VID, GraphError> {
        self.to_internal_id(original_id)
            .ok_or(GraphError::NodeIdError(original_id))
    }
}

#[cfg(test)]
mod csr_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn alice_bob_eve() -> CsrGraph {
        let mut builder = GraphBuilder::new().with_inverse_index(true);
        builder.add_weighted_edge(10, 11, 2.0);
        builder.add_weighted_edge(10, 12, 1.0);
        builder.add_node_property(10, "seed", 23i64).unwrap();
        builder.add_node_property(11, "seed", 24i64).unwrap();
        builder.build()
    }

    #[test]
    fn ids_are_dense_in_order_of_appearance() {
        let g = alice_bob_eve();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.to_internal_id(12), Some(VID(2)));
        assert_eq!(g.to_original_id(VID(1)), 11);
        assert_eq!(g.to_internal_id(99), None);
    }

    #[test]
    fn adjacency_and_inverse() {
        let g = alice_bob_eve();
        assert_eq!(g.neighbours(VID(0)).collect::<Vec<_>>(), vec![VID(1), VID(2)]);
        assert_eq!(g.degree(VID(1)), 0);
        assert_eq!(g.inverse_degree(VID(1)), 1);
        assert_eq!(g.inverse_neighbours(VID(2)).collect::<Vec<_>>(), vec![VID(0)]);
        assert_eq!(
            g.weighted_neighbours(VID(0), 1.0).collect::<Vec<_>>(),
            vec![(VID(1), 2.0), (VID(2), 1.0)]
        );
        assert!(!g.is_multi_graph());
    }

    #[test]
    fn node_properties() {
        let g = alice_bob_eve();
        assert_eq!(g.node_property("seed", VID(1)), Some(Prop::I64(24)));
        assert_eq!(g.node_property("seed", VID(2)), None);
        assert_eq!(g.node_property("missing", VID(0)), None);
    }

    #[test]
    fn mixed_property_types_are_rejected() {
        let mut builder = GraphBuilder::new();
        builder.add_node_property(1, "p", 1i64).unwrap();
        let err = builder.add_node_property(2, "p", 1.0).unwrap_err();
        assert!(matches!(err, GraphError::PropertyTypeError { .. }));
    }

    #[test]
    fn parallel_edges_make_a_multi_graph() {
        let g = CsrGraph::from_edges([(1, 2), (1, 2)]);
        assert!(g.is_multi_graph());
        assert!(!g.has_inverse_index());
        assert_eq!(g.inverse_neighbours(VID(1)).count(), 0);
    }
}
