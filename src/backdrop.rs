//! Particle-net background model.
//!
//! Nodes drift around a spring origin under a slow wind, jitter a little,
//! are pulled toward the pointer when it is close, and wrap softly at the
//! viewport edges. Each frame links every node to its nearest neighbours and
//! gives it a glow that brightens near the pointer. Nothing here draws; a
//! renderer consumes [`Frame`]s.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const MIN_WIDTH: f64 = 320.0;
pub const MIN_HEIGHT: f64 = 240.0;

const REFERENCE_AREA: f64 = 1280.0 * 720.0;
const MIN_NODES: f64 = 18.0;
const MAX_NODES: f64 = 48.0;
const NODES_PER_REFERENCE_AREA: f64 = 24.0;

const INITIAL_SPEED: f64 = 0.3;
const SPRING: f64 = 0.01;
const WIND_GAIN: f64 = 0.06;
const DAMPING: f64 = 0.93;
const JITTER: f64 = 0.04;
const ATTRACTION: f64 = 0.95;
const WRAP_MARGIN: f64 = 40.0;

const NEIGHBOURS: usize = 3;
const BASE_LINK_ALPHA: f64 = 0.18;
const MAX_ALPHA: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub pos: Point,
    pub vx: f64,
    pub vy: f64,
    pub origin: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub from: usize,
    pub to: usize,
    pub alpha: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glow {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<Point>,
    pub links: Vec<Link>,
    pub glows: Vec<Glow>,
}

/// Number of nodes for a viewport, scaled by area and kept within 18..=48.
pub fn node_count(width: f64, height: f64) -> usize {
    (NODES_PER_REFERENCE_AREA * (width * height) / REFERENCE_AREA)
        .clamp(MIN_NODES, MAX_NODES)
        .round() as usize
}

// Non-finite sides fall back to the minimum so node placement stays in range.
fn viewport_side(side: f64, min: f64) -> f64 {
    if !side.is_finite() {
        return min;
    }
    side.max(min)
}

pub struct Field {
    width: f64,
    height: f64,
    nodes: Vec<Node>,
    rng: StdRng,
}

impl Field {
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(width: f64, height: f64) -> Self {
        Self::with_rng(width, height, StdRng::from_entropy())
    }

    fn with_rng(width: f64, height: f64, rng: StdRng) -> Self {
        let mut field = Self {
            width: 0.0,
            height: 0.0,
            nodes: Vec::new(),
            rng,
        };
        field.resize(width, height);
        field
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Re-scatter the nodes over a new viewport.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = viewport_side(width, MIN_WIDTH);
        self.height = viewport_side(height, MIN_HEIGHT);
        let count = node_count(self.width, self.height);
        let (w, h) = (self.width, self.height);
        let rng = &mut self.rng;
        self.nodes = (0..count)
            .map(|_| {
                let pos = Point::new(rng.gen_range(0.0..w), rng.gen_range(0.0..h));
                Node {
                    pos,
                    origin: pos,
                    vx: (rng.r#gen::<f64>() - 0.5) * INITIAL_SPEED,
                    vy: (rng.r#gen::<f64>() - 0.5) * INITIAL_SPEED,
                }
            })
            .collect();
    }

    fn longest_side(&self) -> f64 {
        self.width.max(self.height)
    }

    fn attraction_radius(&self) -> f64 {
        (self.longest_side() * 0.18).clamp(120.0, 380.0)
    }

    fn max_link_distance(&self) -> f64 {
        (self.longest_side() * 0.12).clamp(120.0, 260.0)
    }

    /// Advance one frame. `elapsed_ms` drives the wind direction.
    pub fn step(&mut self, elapsed_ms: f64, pointer: Option<Point>) {
        let t = elapsed_ms * 0.00004;
        let wind_x = (t * 0.8).cos() * 0.06;
        let wind_y = (t * 0.65).sin() * 0.05;
        let reach = self.attraction_radius() * 1.6;
        let (w, h) = (self.width, self.height);

        for node in &mut self.nodes {
            node.vx += (node.origin.x - node.pos.x) * SPRING;
            node.vy += (node.origin.y - node.pos.y) * SPRING;
            node.vx += wind_x * WIND_GAIN;
            node.vy += wind_y * WIND_GAIN;
            node.vx *= DAMPING;
            node.vy *= DAMPING;
            node.vx += (self.rng.r#gen::<f64>() - 0.5) * JITTER;
            node.vy += (self.rng.r#gen::<f64>() - 0.5) * JITTER;

            if let Some(p) = pointer {
                let dx = p.x - node.pos.x;
                let dy = p.y - node.pos.y;
                let dist = dx.hypot(dy).max(0.0001);
                if dist < reach {
                    let pull = (1.0 - dist / reach) * ATTRACTION * ATTRACTION;
                    node.vx += dx / dist * pull;
                    node.vy += dy / dist * pull;
                }
            }

            node.pos.x += node.vx;
            node.pos.y += node.vy;

            if node.pos.x < -WRAP_MARGIN {
                node.pos.x = w + WRAP_MARGIN;
            }
            if node.pos.x > w + WRAP_MARGIN {
                node.pos.x = -WRAP_MARGIN;
            }
            if node.pos.y < -WRAP_MARGIN {
                node.pos.y = h + WRAP_MARGIN;
            }
            if node.pos.y > h + WRAP_MARGIN {
                node.pos.y = -WRAP_MARGIN;
            }
        }
    }

    /// Links from each node to its nearest neighbours within link range.
    pub fn links(&self, pointer: Option<Point>) -> Vec<Link> {
        let max_dist = self.max_link_distance();
        let side = self.longest_side();
        let mut links = Vec::new();

        for (i, a) in self.nodes.iter().enumerate() {
            let mut near: Vec<(usize, f64)> = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, b)| (j, a.pos.distance(b.pos)))
                .collect();
            near.sort_by(|x, y| x.1.total_cmp(&y.1));

            for &(j, dist) in near.iter().take(NEIGHBOURS) {
                if dist > max_dist {
                    continue;
                }
                let mut alpha = (BASE_LINK_ALPHA - dist / max_dist * 0.12).max(0.0);
                if let Some(p) = pointer {
                    let b = self.nodes[j].pos;
                    let mid = Point::new((a.pos.x + b.x) / 2.0, (a.pos.y + b.y) / 2.0);
                    alpha += (0.42 - p.distance(mid) / side).max(0.0);
                }
                links.push(Link {
                    from: i,
                    to: j,
                    alpha: alpha.min(MAX_ALPHA),
                    width: (1.0 - dist / side).max(0.35),
                });
            }
        }
        links
    }

    pub fn glows(&self, pointer: Option<Point>) -> Vec<Glow> {
        let falloff = self.longest_side() * 0.25;
        self.nodes
            .iter()
            .map(|n| {
                let influence = match pointer {
                    Some(p) => (1.0 - n.pos.distance(p) / falloff).max(0.0),
                    None => 0.0,
                };
                Glow {
                    x: n.pos.x,
                    y: n.pos.y,
                    radius: 1.2 + influence * 2.8,
                    alpha: (0.35 + influence * 0.65).min(0.98),
                }
            })
            .collect()
    }

    pub fn frame(&self, pointer: Option<Point>) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            nodes: self.nodes.iter().map(|n| n.pos).collect(),
            links: self.links(pointer),
            glows: self.glows(pointer),
        }
    }
}
