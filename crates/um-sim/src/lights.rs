//! The simulation's traffic lights, indexed by node.

use um_core::NodeId;
use um_signal::{ControlStrategy, TrafficLight};
use um_spatial::RoadGraph;

/// All traffic lights of a run plus a dense node → light lookup.
#[derive(Clone, Debug, Default)]
pub struct LightSet {
    lights:  Vec<TrafficLight>,
    by_node: Vec<Option<usize>>,
}

impl LightSet {
    /// One light per signal site of `graph`, in registration order, all
    /// running `strategy`.
    pub fn from_graph(graph: &RoadGraph, strategy: &ControlStrategy, peak_hour: bool) -> Self {
        let mut by_node = vec![None; graph.node_count()];
        let lights = graph
            .signals()
            .iter()
            .enumerate()
            .map(|(i, site)| {
                by_node[site.node.index()] = Some(i);
                TrafficLight::new(site.node, site.direction_hint.as_str(), strategy.clone(), peak_hour)
            })
            .collect();
        Self { lights, by_node }
    }

    /// Index of the light at `node`, if it has one.
    #[inline]
    pub fn index_at(&self, node: NodeId) -> Option<usize> {
        self.by_node.get(node.index()).copied().flatten()
    }

    pub fn at(&self, node: NodeId) -> Option<&TrafficLight> {
        self.index_at(node).map(|i| &self.lights[i])
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&TrafficLight> {
        self.lights.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TrafficLight> {
        self.lights.get_mut(index)
    }

    pub fn as_slice(&self) -> &[TrafficLight] {
        &self.lights
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrafficLight> + '_ {
        self.lights.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Vehicles waiting at all lights.
    pub fn total_queued(&self) -> usize {
        self.lights.iter().map(TrafficLight::total_queued).sum()
    }
}
