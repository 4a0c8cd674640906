//! Static bulk-loaded R-tree over points.
//!
//! Entries are packed bottom-up with sort-tile-recursive slabs on the first
//! two coordinates. The tree is rebuilt per query batch, so there is no
//! insertion or deletion.

use crate::point::Point;

const DEFAULT_FANOUT: usize = 8;

/// Minimum bounding rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Mbr {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Mbr {
    fn of_point(p: &Point) -> Self {
        Self {
            lower: p.coords().to_vec(),
            upper: p.coords().to_vec(),
        }
    }

    fn extend(&mut self, other: &Mbr) {
        for (l, o) in self.lower.iter_mut().zip(&other.lower) {
            *l = l.min(*o);
        }
        for (u, o) in self.upper.iter_mut().zip(&other.upper) {
            *u = u.max(*o);
        }
    }

    fn center(&self, axis: usize) -> f64 {
        (self.lower[axis] + self.upper[axis]) / 2.0
    }
}

#[derive(Clone, Debug)]
pub enum RTreeNode {
    /// Entry positions into the slice the tree was built from.
    Leaf { mbr: Mbr, entries: Vec<usize> },
    Inner { mbr: Mbr, children: Vec<usize> },
}

impl RTreeNode {
    pub fn mbr(&self) -> &Mbr {
        match self {
            RTreeNode::Leaf { mbr, .. } | RTreeNode::Inner { mbr, .. } => mbr,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RTree {
    nodes: Vec<RTreeNode>,
    root: Option<usize>,
}

impl RTree {
    pub fn bulk_load(points: &[&Point]) -> Self {
        Self::bulk_load_with_fanout(points, DEFAULT_FANOUT)
    }

    pub fn bulk_load_with_fanout(points: &[&Point], fanout: usize) -> Self {
        let fanout = fanout.max(2);
        let mut nodes = Vec::new();
        if points.is_empty() {
            return Self { nodes, root: None };
        }

        let boxes: Vec<Mbr> = points.iter().map(|p| Mbr::of_point(p)).collect();
        let mut level: Vec<usize> = Vec::new();
        for group in pack(&boxes, (0..points.len()).collect(), fanout) {
            let mbr = enclose(&boxes, &group);
            nodes.push(RTreeNode::Leaf {
                mbr,
                entries: group,
            });
            level.push(nodes.len() - 1);
        }

        while level.len() > 1 {
            let level_boxes: Vec<Mbr> = nodes.iter().map(|n| n.mbr().clone()).collect();
            let mut next = Vec::new();
            for group in pack(&level_boxes, level, fanout) {
                let mbr = enclose(&level_boxes, &group);
                nodes.push(RTreeNode::Inner {
                    mbr,
                    children: group,
                });
                next.push(nodes.len() - 1);
            }
            level = next;
        }

        let root = level.first().copied();
        Self { nodes, root }
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn node(&self, id: usize) -> &RTreeNode {
        &self.nodes[id]
    }

    pub fn len_nodes(&self) -> usize {
        self.nodes.len()
    }
}

fn enclose(boxes: &[Mbr], members: &[usize]) -> Mbr {
    let mut mbr = boxes[members[0]].clone();
    for &m in &members[1..] {
        mbr.extend(&boxes[m]);
    }
    mbr
}

/// Sort-tile-recursive grouping of `items` (indices into `boxes`).
fn pack(boxes: &[Mbr], mut items: Vec<usize>, fanout: usize) -> Vec<Vec<usize>> {
    let dim = boxes[items[0]].lower.len();
    items.sort_by(|&a, &b| boxes[a].center(0).total_cmp(&boxes[b].center(0)));
    if dim < 2 {
        return items.chunks(fanout).map(<[usize]>::to_vec).collect();
    }

    let leaves = items.len().div_ceil(fanout);
    let slabs = (leaves as f64).sqrt().ceil() as usize;
    let slab_size = slabs * fanout;
    let mut groups = Vec::with_capacity(leaves);
    for slab in items.chunks(slab_size) {
        let mut slab = slab.to_vec();
        slab.sort_by(|&a, &b| boxes[a].center(1).total_cmp(&boxes[b].center(1)));
        groups.extend(slab.chunks(fanout).map(<[usize]>::to_vec));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::PointSet;

    fn collect_entries(tree: &RTree, node: usize, out: &mut Vec<usize>) {
        match tree.node(node) {
            RTreeNode::Leaf { entries, .. } => out.extend(entries),
            RTreeNode::Inner { children, .. } => {
                for &c in children {
                    collect_entries(tree, c, out);
                }
            }
        }
    }

    #[test]
    fn test_every_point_indexed_once() {
        let rows: Vec<Vec<f64>> = (0..100)
            .map(|i| vec![(i % 10) as f64, (i / 10) as f64, (i * 7 % 13) as f64])
            .collect();
        let set = PointSet::from_rows(rows).unwrap();
        let refs: Vec<&Point> = set.iter().collect();
        let tree = RTree::bulk_load_with_fanout(&refs, 4);
        let mut entries = Vec::new();
        collect_entries(&tree, tree.root().unwrap(), &mut entries);
        entries.sort_unstable();
        assert_eq!(entries, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_parent_box_encloses_children() {
        let set = PointSet::from_rows((0..30).map(|i| vec![i as f64, (30 - i) as f64]).collect())
            .unwrap();
        let refs: Vec<&Point> = set.iter().collect();
        let tree = RTree::bulk_load_with_fanout(&refs, 3);
        let root = tree.node(tree.root().unwrap()).mbr();
        assert_eq!(root.lower, vec![0.0, 1.0]);
        assert_eq!(root.upper, vec![29.0, 30.0]);
    }

    #[test]
    fn test_empty_tree() {
        assert!(RTree::bulk_load(&[]).root().is_none());
    }
}
