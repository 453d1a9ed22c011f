//! Moving nodes and their per-node brightness
//!
//! Nodes drift at constant velocity and bounce elastically off the surface
//! edges. Brightness is stored in a parallel array so the wave engine can
//! raise it without touching the nodes themselves.

use rand::Rng;

use crate::color::Rgb;
use crate::geometry::Point;

/// A moving point of the mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position in CSS pixels
    pub x: f64,
    pub y: f64,
    /// Velocity in pixels per frame
    pub vx: f64,
    pub vy: f64,
    /// Palette color
    pub color: Rgb,
}

impl Node {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// All nodes of one surface generation plus their brightness
#[derive(Debug, Clone, Default)]
pub struct NodeField {
    nodes: Vec<Node>,
    brightness: Vec<f64>,
    width: f64,
    height: f64,
}

impl NodeField {
    /// Field with the given nodes and all-zero brightness
    ///
    /// Positions are taken as-is; use this for hand-built layouts.
    pub fn from_nodes(nodes: Vec<Node>, width: f64, height: f64) -> Self {
        let brightness = vec![0.0; nodes.len()];
        Self {
            nodes,
            brightness,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Regenerate `count` nodes at random positions inside `width x height`
    ///
    /// Velocity components are uniform in `[-speed_cap, speed_cap)`; colors
    /// cycle through `palette` by index. Brightness is reset to zero.
    pub fn initialize<R: Rng>(
        &mut self,
        count: usize,
        width: f64,
        height: f64,
        speed_cap: f64,
        palette: &[Rgb],
        rng: &mut R,
    ) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);

        self.nodes.clear();
        self.nodes.reserve(count);
        for i in 0..count {
            let vx = (rng.random::<f64>() - 0.5) * speed_cap * 2.0;
            let vy = (rng.random::<f64>() - 0.5) * speed_cap * 2.0;
            self.nodes.push(Node {
                x: rng.random::<f64>() * self.width,
                y: rng.random::<f64>() * self.height,
                vx,
                vy,
                color: palette
                    .get(i % palette.len().max(1))
                    .copied()
                    .unwrap_or(crate::color::WHITE),
            });
        }

        self.brightness.clear();
        self.brightness.resize(count, 0.0);
    }

    /// Move every node one frame and decay its brightness
    ///
    /// A node that leaves `[0, width]` or `[0, height]` on an axis has that
    /// velocity component inverted and its position clamped back inside.
    /// Brightness is multiplied by `fade` and snaps to zero below `floor`.
    pub fn advance(&mut self, fade: f64, floor: f64) {
        let (width, height) = (self.width, self.height);

        for (node, glow) in self.nodes.iter_mut().zip(self.brightness.iter_mut()) {
            node.x += node.vx;
            node.y += node.vy;

            if node.x < 0.0 || node.x > width {
                node.vx = -node.vx;
                node.x = node.x.clamp(0.0, width);
            }
            if node.y < 0.0 || node.y > height {
                node.vy = -node.vy;
                node.y = node.y.clamp(0.0, height);
            }

            *glow *= fade;
            if *glow < floor {
                *glow = 0.0;
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn brightness(&self) -> &[f64] {
        &self.brightness
    }

    /// Mutable brightness for the wave engine
    pub fn brightness_mut(&mut self) -> &mut [f64] {
        &mut self.brightness
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Index of the node closest to `p` that is strictly within `max_distance`
    pub fn closest_node(&self, p: Point, max_distance: f64) -> Option<usize> {
        let mut best = max_distance;
        let mut pick = None;

        for (i, node) in self.nodes.iter().enumerate() {
            let dist = node.position().distance_to(p);
            if dist < best {
                best = dist;
                pick = Some(i);
            }
        }

        pick
    }
}
