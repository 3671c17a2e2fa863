//! Subset approximation for edges too large to enumerate.
//!
//! The constraints of the edge are grouped into overlapping subsets whose
//! combined unknown squares fit under the size limit. Each subset is solved
//! exactly against its own constraints only, and a square that appears in
//! several subsets gets the mean of its per-subset probabilities.
//!
//! Subsets are grown as a search tree per root constraint, stored in an arena
//! and addressed by index. A node extends its path with every adjacent
//! constraint not on the path yet, as long as the union of squares stays
//! within the limit. Nodes that cannot be extended are leaves, and each leaf
//! path is a candidate subset.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::enumerate::{enumerate, Constraint, EdgeSolution};
use crate::error::SolverError;
use crate::types::{hash_square_set, Square};

struct Node {
    constraint: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Edge indices covered by the path from the root to this node.
    squares: BTreeSet<usize>,
    /// Extensions that would repeat a branch already in the arena.
    merged: usize,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.merged == 0
    }
}

/// Sorted constraint indices on the path from the root to `idx`.
fn path_of(arena: &[Node], idx: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = Some(idx);
    while let Some(i) = current {
        path.push(arena[i].constraint);
        current = arena[i].parent;
    }
    path.sort_unstable();
    path
}

/// Grow the subset tree and return the constraint sets of all its leaves.
fn grow_subsets(members: &[Vec<usize>], adjacency: &[Vec<usize>], limit: usize) -> Vec<Vec<usize>> {
    let mut arena: Vec<Node> = Vec::new();
    let mut stack = Vec::new();

    for (root, squares) in members.iter().enumerate() {
        if squares.len() > limit {
            log::trace!("constraint {} alone covers {} squares, pruned", root, squares.len());
            continue;
        }
        arena.push(Node {
            constraint: root,
            parent: None,
            children: Vec::new(),
            squares: squares.iter().copied().collect(),
            merged: 0,
        });
        stack.push(arena.len() - 1);
    }

    // (path, next constraint) pairs already expanded somewhere in the arena.
    let mut expanded: HashSet<(Vec<usize>, usize)> = HashSet::new();

    while let Some(idx) = stack.pop() {
        let path = path_of(&arena, idx);
        let current = arena[idx].constraint;

        for &next in &adjacency[current] {
            if path.binary_search(&next).is_ok() {
                continue;
            }
            let mut squares = arena[idx].squares.clone();
            squares.extend(members[next].iter().copied());
            if squares.len() > limit {
                continue;
            }
            if !expanded.insert((path.clone(), next)) {
                arena[idx].merged += 1;
                continue;
            }

            arena.push(Node {
                constraint: next,
                parent: Some(idx),
                children: Vec::new(),
                squares,
                merged: 0,
            });
            let child = arena.len() - 1;
            arena[idx].children.push(child);
            stack.push(child);
        }
    }

    log::debug!("subset tree grew to {} nodes", arena.len());

    (0..arena.len())
        .filter(|&i| arena[i].is_leaf())
        .map(|i| path_of(&arena, i))
        .collect()
}

/// Drop duplicate leaf sets, then every set strictly contained in another.
fn maximal_subsets(leaves: Vec<Vec<usize>>, constraints: &[Constraint]) -> Vec<Vec<usize>> {
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut unique: Vec<Vec<usize>> = Vec::new();

    for leaf in leaves {
        let squares: Vec<Square> = leaf.iter().map(|&c| constraints[c].square).collect();
        let bucket = buckets.entry(hash_square_set(&squares)).or_default();
        if bucket.iter().any(|&u| unique[u] == leaf) {
            continue;
        }
        bucket.push(unique.len());
        unique.push(leaf);
    }

    unique
        .iter()
        .filter(|a| !unique.iter().any(|b| is_proper_subset(a, b)))
        .cloned()
        .collect()
}

/// Both slices are sorted.
fn is_proper_subset(a: &[usize], b: &[usize]) -> bool {
    a.len() < b.len() && a.iter().all(|x| b.binary_search(x).is_ok())
}

/// Approximate the probabilities of an oversized edge.
///
/// Squares that end up in no subset are left out of the returned solution.
/// The returned expected mine count is the summed remaining count of every
/// constraint divided by the number of squares kept.
pub fn approximate(edge: &[Square], constraints: &[Constraint], limit: usize) -> Result<EdgeSolution, SolverError> {
    let index: HashMap<Square, usize> = edge.iter().enumerate().map(|(i, &sq)| (sq, i)).collect();

    let members: Vec<Vec<usize>> = constraints
        .iter()
        .map(|c| c.neighbors.iter().filter_map(|sq| index.get(sq).copied()).collect())
        .collect();

    let mut owners: Vec<Vec<usize>> = vec![Vec::new(); edge.len()];
    for (c, squares) in members.iter().enumerate() {
        for &i in squares {
            owners[i].push(c);
        }
    }

    let adjacency: Vec<Vec<usize>> = members
        .iter()
        .enumerate()
        .map(|(c, squares)| {
            let linked: BTreeSet<usize> = squares
                .iter()
                .flat_map(|&i| owners[i].iter().copied())
                .filter(|&other| other != c)
                .collect();
            linked.into_iter().collect()
        })
        .collect();

    let subsets = maximal_subsets(grow_subsets(&members, &adjacency, limit), constraints);
    log::debug!("{} unique subsets found", subsets.len());

    let mut sums = vec![0.0f64; edge.len()];
    let mut appearances = vec![0usize; edge.len()];

    for subset in &subsets {
        let covered: BTreeSet<usize> = subset.iter().flat_map(|&c| members[c].iter().copied()).collect();
        let squares: Vec<Square> = covered.iter().map(|&i| edge[i]).collect();

        let tally = enumerate(&squares, subset.iter().map(|&c| &constraints[c]))?;
        log::debug!(
            "{} consistent assignments for subset of {} squares",
            tally.consistent,
            squares.len()
        );

        let total = tally.consistent as f64;
        for (&i, &n) in covered.iter().zip(&tally.mine_counts) {
            sums[i] += n as f64 / total;
            appearances[i] += 1;
        }
    }

    let mut solution = EdgeSolution {
        squares: Vec::new(),
        probabilities: Vec::new(),
        expected_mines: 0.0,
    };
    for (i, &sq) in edge.iter().enumerate() {
        if appearances[i] == 0 {
            log::trace!("{:?} is in no subset, dropped from edge", sq);
            continue;
        }
        solution.squares.push(sq);
        solution.probabilities.push(sums[i] / appearances[i] as f64);
    }

    if !solution.squares.is_empty() {
        let remaining: i32 = constraints.iter().map(|c| c.remaining).sum();
        solution.expected_mines = remaining as f64 / solution.squares.len() as f64;
    }
    Ok(solution)
}
