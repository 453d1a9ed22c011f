//! Pulse wave propagation over the link graph
//!
//! A wave is a delayed breadth-first traversal: each arrival lights its node
//! and sends an attenuated pulse to every not-yet-visited neighbor, which
//! arrives after a fixed number of frames in transit. Neighbors are looked up
//! in the graph of the frame in which the arrival happens, so a wave follows
//! the mesh as it drifts.

use std::collections::HashSet;

use thiserror::Error;

use crate::links::LinkGraph;

/// Errors reported by the wave engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaveError {
    /// The requested origin is not a node of the current field
    #[error("wave origin {origin} is out of range for {len} nodes")]
    OriginOutOfRange { origin: usize, len: usize },
}

/// A pulse travelling towards `node`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    /// Target node index
    pub node: usize,
    /// Brightness delivered on arrival, in `(0, 1]`
    pub power: f64,
    /// Frames left in transit; `0` means it lands on the next step
    pub wait: u32,
}

/// Wave front and visited-set of the current wave
#[derive(Debug, Clone)]
pub struct WaveEngine {
    front: Vec<Arrival>,
    visited: HashSet<usize>,
    /// Power multiplier per hop
    hop_strength: f64,
    /// Frames in transit per hop
    hop_frames: u32,
}

impl WaveEngine {
    pub fn new(hop_strength: f64, hop_frames: u32) -> Self {
        Self {
            front: Vec::new(),
            visited: HashSet::new(),
            hop_strength,
            hop_frames,
        }
    }

    /// Start a new wave at `origin`, replacing any wave in flight
    ///
    /// Returns an error and leaves the current wave untouched when `origin`
    /// is not below `node_count`.
    pub fn start(&mut self, origin: usize, node_count: usize) -> Result<(), WaveError> {
        if origin >= node_count {
            return Err(WaveError::OriginOutOfRange {
                origin,
                len: node_count,
            });
        }

        self.front.clear();
        self.front.push(Arrival {
            node: origin,
            power: 1.0,
            wait: 0,
        });
        self.visited.clear();
        self.visited.insert(origin);
        Ok(())
    }

    /// Advance every pulse by one frame
    ///
    /// Pulses still in transit count down. Pulses that land raise the
    /// brightness of their node to at least their power and fan out to the
    /// unvisited neighbors in `graph`. Arrivals for nodes outside `brightness`
    /// are dropped.
    pub fn step(&mut self, graph: &LinkGraph, brightness: &mut [f64]) {
        if self.front.is_empty() {
            return;
        }

        let mut next = Vec::with_capacity(self.front.len());
        for arrival in self.front.drain(..) {
            if arrival.wait > 0 {
                next.push(Arrival {
                    wait: arrival.wait - 1,
                    ..arrival
                });
                continue;
            }

            let Some(glow) = brightness.get_mut(arrival.node) else {
                continue;
            };
            *glow = glow.max(arrival.power);

            // A pulse with no power left ends the branch
            let power = arrival.power * self.hop_strength;
            if power <= 0.0 {
                continue;
            }
            for neighbor in graph.neighbors_of(arrival.node) {
                if !self.visited.insert(neighbor) {
                    continue;
                }
                next.push(Arrival {
                    node: neighbor,
                    power,
                    wait: self.hop_frames,
                });
            }
        }

        self.front = next;
    }

    /// Drop the current wave entirely
    pub fn clear(&mut self) {
        self.front.clear();
        self.visited.clear();
    }

    /// Whether no pulse is in flight (the last wave has finished)
    pub fn is_idle(&self) -> bool {
        self.front.is_empty()
    }

    pub fn front(&self) -> &[Arrival] {
        &self.front
    }

    /// Number of nodes reached or scheduled by the current wave
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn has_visited(&self, node: usize) -> bool {
        self.visited.contains(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::Link;

    const STRENGTH: f64 = 0.78;
    const HOP: u32 = 25;

    fn path_graph() -> LinkGraph {
        LinkGraph::from_links([Link::new(0, 1), Link::new(1, 2)])
    }

    #[test]
    fn start_seeds_front_and_visited() {
        let mut engine = WaveEngine::new(STRENGTH, HOP);
        engine.start(2, 5).unwrap();

        assert_eq!(
            engine.front(),
            &[Arrival {
                node: 2,
                power: 1.0,
                wait: 0
            }]
        );
        assert_eq!(engine.visited_len(), 1);
        assert!(engine.has_visited(2));
    }

    #[test]
    fn out_of_range_origin_is_rejected_without_side_effects() {
        let mut engine = WaveEngine::new(STRENGTH, HOP);
        engine.start(0, 3).unwrap();

        assert_eq!(
            engine.start(3, 3),
            Err(WaveError::OriginOutOfRange { origin: 3, len: 3 })
        );
        assert_eq!(engine.front().len(), 1);
        assert!(engine.has_visited(0));
        assert!(engine.start(0, 0).is_err());
    }

    #[test]
    fn isolated_origin_finishes_after_one_step() {
        let graph = LinkGraph::default();
        let mut brightness = vec![0.0; 3];
        let mut engine = WaveEngine::new(STRENGTH, HOP);
        engine.start(1, 3).unwrap();

        engine.step(&graph, &mut brightness);

        assert!(engine.is_idle());
        assert_eq!(brightness, vec![0.0, 1.0, 0.0]);
        assert_eq!(engine.visited_len(), 1);
    }

    #[test]
    fn path_graph_propagates_with_delay_and_attenuation() {
        let graph = path_graph();
        let mut brightness = vec![0.0; 3];
        let mut engine = WaveEngine::new(STRENGTH, HOP);
        engine.start(0, 3).unwrap();

        // Origin lands on the first step
        engine.step(&graph, &mut brightness);
        assert_eq!(brightness, vec![1.0, 0.0, 0.0]);

        // Each hop spends HOP steps in transit and lands on the step after
        for _ in 0..HOP {
            engine.step(&graph, &mut brightness);
            assert_eq!(brightness[1], 0.0);
        }
        engine.step(&graph, &mut brightness);
        assert_eq!(brightness[1], STRENGTH);
        assert_eq!(brightness[2], 0.0);

        for _ in 0..HOP {
            engine.step(&graph, &mut brightness);
        }
        engine.step(&graph, &mut brightness);
        assert_eq!(brightness[2], STRENGTH * STRENGTH);

        // Node 0 was never re-scheduled and the wave is done
        assert!(engine.is_idle());
        assert_eq!(brightness[0], 1.0);
        assert_eq!(engine.visited_len(), 3);
    }

    #[test]
    fn origin_never_receives_second_arrival() {
        let graph = path_graph();
        let mut brightness = vec![0.0; 3];
        let mut engine = WaveEngine::new(STRENGTH, 0);
        engine.start(0, 3).unwrap();

        engine.step(&graph, &mut brightness);
        brightness[0] = 0.0;
        while !engine.is_idle() {
            assert!(engine.front().iter().all(|a| a.node != 0));
            engine.step(&graph, &mut brightness);
        }
        assert_eq!(brightness[0], 0.0);
    }

    #[test]
    fn arrival_never_lowers_brightness() {
        let graph = path_graph();
        let mut brightness = vec![0.0, 0.95, 0.0];
        let mut engine = WaveEngine::new(STRENGTH, 0);
        engine.start(0, 3).unwrap();

        engine.step(&graph, &mut brightness);
        engine.step(&graph, &mut brightness);
        assert_eq!(brightness[1], 0.95);
    }

    #[test]
    fn visited_set_grows_monotonically_and_resets_on_start() {
        // Ring of six nodes plus a chord
        let graph = LinkGraph::from_links(
            [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (0, 3)]
                .into_iter()
                .map(|(a, b)| Link::new(a, b)),
        );
        let mut brightness = vec![0.0; 6];
        let mut engine = WaveEngine::new(STRENGTH, 2);
        engine.start(0, 6).unwrap();

        let mut previous = engine.visited_len();
        for _ in 0..20 {
            engine.step(&graph, &mut brightness);
            assert!(engine.visited_len() >= previous);
            previous = engine.visited_len();
        }
        assert_eq!(engine.visited_len(), 6);
        assert!(engine.is_idle());

        engine.start(4, 6).unwrap();
        assert_eq!(engine.visited_len(), 1);
    }

    #[test]
    fn new_wave_replaces_front() {
        let graph = path_graph();
        let mut brightness = vec![0.0; 3];
        let mut engine = WaveEngine::new(STRENGTH, HOP);
        engine.start(0, 3).unwrap();
        engine.step(&graph, &mut brightness);
        assert_eq!(engine.front()[0].node, 1);

        engine.start(2, 3).unwrap();
        assert_eq!(engine.front().len(), 1);
        assert_eq!(engine.front()[0].node, 2);
        assert!(!engine.has_visited(1));
    }

    #[test]
    fn neighbors_come_from_graph_at_arrival_time() {
        let mut brightness = vec![0.0; 3];
        let mut engine = WaveEngine::new(STRENGTH, 1);
        engine.start(0, 3).unwrap();

        let before = LinkGraph::from_links([Link::new(0, 1)]);
        engine.step(&before, &mut brightness);

        // Node 2 drifts into range of node 1 while the pulse is in transit
        let after = LinkGraph::from_links([Link::new(0, 1), Link::new(1, 2)]);
        engine.step(&after, &mut brightness);
        engine.step(&after, &mut brightness);
        assert_eq!(brightness[1], STRENGTH);
        assert!(engine.has_visited(2));
    }

    #[test]
    fn powerless_hops_are_never_queued() {
        let graph = LinkGraph::from_links([Link::new(0, 1)]);
        let mut brightness = vec![0.0; 2];
        let mut engine = WaveEngine::new(0.0, HOP);
        engine.start(0, 2).unwrap();

        engine.step(&graph, &mut brightness);
        assert!(engine.is_idle());
        assert_eq!(brightness, vec![1.0, 0.0]);
    }

    #[test]
    fn queued_power_stays_in_unit_range() {
        let graph = path_graph();
        let mut brightness = vec![0.0; 3];
        let mut engine = WaveEngine::new(STRENGTH, 0);
        engine.start(0, 3).unwrap();

        while !engine.is_idle() {
            for arrival in engine.front() {
                assert!(arrival.power > 0.0 && arrival.power <= 1.0);
            }
            engine.step(&graph, &mut brightness);
        }
    }

    #[test]
    fn stale_arrivals_are_dropped() {
        let graph = LinkGraph::default();
        let mut engine = WaveEngine::new(STRENGTH, HOP);
        engine.start(4, 5).unwrap();

        let mut shrunk = vec![0.0; 2];
        engine.step(&graph, &mut shrunk);
        assert!(engine.is_idle());
        assert_eq!(shrunk, vec![0.0, 0.0]);
    }

    #[test]
    fn step_on_idle_engine_is_noop() {
        let graph = path_graph();
        let mut brightness = vec![0.3; 3];
        let mut engine = WaveEngine::new(STRENGTH, HOP);
        engine.step(&graph, &mut brightness);
        assert_eq!(brightness, vec![0.3; 3]);

        engine.start(1, 3).unwrap();
        engine.clear();
        assert!(engine.is_idle());
        assert_eq!(engine.visited_len(), 0);
    }
}
