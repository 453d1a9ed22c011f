//! Proximity link graph
//!
//! Links are derived data: the whole graph is rebuilt from node positions
//! every frame. Node counts are capped low, so an exhaustive pairwise scan is
//! used instead of a spatial index and distances are exact.

use crate::field::Node;

/// An unordered pair of linked node indices, stored with `a < b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link {
    pub a: usize,
    pub b: usize,
}

impl Link {
    /// Create a link, normalizing the order of the endpoints
    pub fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { a: i, b: j }
        } else {
            Self { a: j, b: i }
        }
    }

    /// The endpoint opposite `index`, if `index` is on this link
    pub fn other(&self, index: usize) -> Option<usize> {
        if self.a == index {
            Some(self.b)
        } else if self.b == index {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Links between every pair of nodes within a distance threshold
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    links: Vec<Link>,
}

impl LinkGraph {
    /// Build a graph from scratch
    pub fn build(nodes: &[Node], threshold: f64) -> Self {
        let mut graph = Self::default();
        graph.rebuild(nodes, threshold);
        graph
    }

    /// Graph with an explicit set of links (normalized, sorted and deduplicated)
    pub fn from_links(links: impl IntoIterator<Item = Link>) -> Self {
        let mut links: Vec<Link> = links.into_iter().filter(|l| l.a != l.b).collect();
        links.sort_unstable();
        links.dedup();
        Self { links }
    }

    /// Recompute all links from current node positions
    ///
    /// A pair is linked iff the Euclidean distance is `<= threshold`. Links
    /// come out ordered by first index, then second. The allocation is reused
    /// between frames.
    pub fn rebuild(&mut self, nodes: &[Node], threshold: f64) {
        self.links.clear();

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let dx = nodes[j].x - nodes[i].x;
                let dy = nodes[j].y - nodes[i].y;
                if dx.hypot(dy) <= threshold {
                    self.links.push(Link { a: i, b: j });
                }
            }
        }
    }

    /// All nodes linked to `index`
    pub fn neighbors_of(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.links.iter().filter_map(move |link| link.other(index))
    }

    /// Whether `i` and `j` are linked, in either order
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.links.binary_search(&Link::new(i, j)).is_ok()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
