//! Octree color quantizer used for `algorithm = octree`.

const MAX_DEPTH: usize = 8;

#[derive(Clone, Debug, Default)]
struct Node {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
    children: [Option<usize>; 8],
    leaf: bool,
    palette_index: usize,
}

/// Octree over RGB. Leaves are merged bottom-up until at most `max_colors` remain.
pub(crate) struct Octree {
    nodes: Vec<Node>,
    reducible: [Vec<usize>; MAX_DEPTH],
    leaves: usize,
    max_colors: usize,
    palette: Vec<[u8; 3]>,
}

fn child_index(rgb: [u8; 3], level: usize) -> usize {
    let shift = 7 - level;
    (usize::from((rgb[0] >> shift) & 1) << 2)
        | (usize::from((rgb[1] >> shift) & 1) << 1)
        | usize::from((rgb[2] >> shift) & 1)
}

impl Octree {
    pub(crate) fn new(max_colors: usize) -> Self {
        let mut reducible: [Vec<usize>; MAX_DEPTH] = Default::default();
        reducible[0].push(0);
        Self {
            nodes: vec![Node::default()],
            reducible,
            leaves: 0,
            max_colors: max_colors.max(1),
            palette: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, rgb: [u8; 3]) {
        let mut node = 0usize;
        for level in 0..MAX_DEPTH {
            if self.nodes[node].leaf {
                break;
            }
            let ci = child_index(rgb, level);
            node = match self.nodes[node].children[ci] {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    let depth = level + 1;
                    self.nodes.push(Node {
                        leaf: depth == MAX_DEPTH,
                        ..Node::default()
                    });
                    self.nodes[node].children[ci] = Some(child);
                    if depth == MAX_DEPTH {
                        self.leaves += 1;
                    } else {
                        self.reducible[depth].push(child);
                    }
                    child
                }
            };
        }
        let n = &mut self.nodes[node];
        n.r += u64::from(rgb[0]);
        n.g += u64::from(rgb[1]);
        n.b += u64::from(rgb[2]);
        n.count += 1;

        while self.leaves > self.max_colors {
            if !self.reduce() {
                break;
            }
        }
    }

    // Merge the children of the most recently created node on the deepest reducible level.
    fn reduce(&mut self) -> bool {
        let Some(level) = (0..MAX_DEPTH).rev().find(|&l| !self.reducible[l].is_empty()) else {
            return false;
        };
        let Some(node) = self.reducible[level].pop() else {
            return false;
        };

        let (mut r, mut g, mut b, mut count, mut merged) = (0, 0, 0, 0, 0usize);
        for ci in 0..8 {
            if let Some(child) = self.nodes[node].children[ci].take() {
                let c = &self.nodes[child];
                r += c.r;
                g += c.g;
                b += c.b;
                count += c.count;
                merged += 1;
            }
        }
        let n = &mut self.nodes[node];
        n.r += r;
        n.g += g;
        n.b += b;
        n.count += count;
        n.leaf = true;
        self.leaves = (self.leaves + 1).saturating_sub(merged);
        true
    }

    /// Assign palette indices to every leaf and return the palette.
    pub(crate) fn build_palette(&mut self) -> &[[u8; 3]] {
        self.palette.clear();
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            if self.nodes[node].leaf {
                let n = &mut self.nodes[node];
                if n.count > 0 {
                    n.palette_index = self.palette.len();
                    self.palette.push([
                        (n.r / n.count) as u8,
                        (n.g / n.count) as u8,
                        (n.b / n.count) as u8,
                    ]);
                }
                continue;
            }
            for ci in (0..8).rev() {
                if let Some(child) = self.nodes[node].children[ci] {
                    stack.push(child);
                }
            }
        }
        &self.palette
    }

    /// Palette color for `rgb`. Call after [`Octree::build_palette`].
    pub(crate) fn map(&self, rgb: [u8; 3]) -> [u8; 3] {
        let mut node = 0usize;
        for level in 0..MAX_DEPTH {
            if self.nodes[node].leaf {
                break;
            }
            match self.nodes[node].children[child_index(rgb, level)] {
                Some(child) => node = child,
                None => return self.nearest(rgb),
            }
        }
        let n = &self.nodes[node];
        if n.leaf && n.count > 0 {
            self.palette
                .get(n.palette_index)
                .copied()
                .unwrap_or_else(|| self.nearest(rgb))
        } else {
            self.nearest(rgb)
        }
    }

    fn nearest(&self, rgb: [u8; 3]) -> [u8; 3] {
        let dist = |p: &[u8; 3]| -> u32 {
            p.iter()
                .zip(rgb.iter())
                .map(|(a, b)| {
                    let d = i32::from(*a) - i32::from(*b);
                    (d * d) as u32
                })
                .sum()
        };
        self.palette
            .iter()
            .min_by_key(|p| dist(p))
            .copied()
            .unwrap_or(rgb)
    }
}

/// Reduce a straight-alpha RGBA8 frame to at most `max_colors` opaque colors plus full
/// transparency. Alpha is thresholded at 50%.
pub(crate) fn quantize_octree_in_place(rgba: &mut [u8], max_colors: usize) {
    let mut tree = Octree::new(max_colors);
    for px in rgba.chunks_exact(4) {
        if px[3] >= 128 {
            tree.insert([px[0], px[1], px[2]]);
        }
    }
    tree.build_palette();
    for px in rgba.chunks_exact_mut(4) {
        if px[3] < 128 {
            px.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        let [r, g, b] = tree.map([px[0], px[1], px[2]]);
        px.copy_from_slice(&[r, g, b, 255]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/palette.rs"]
mod tests;
