//! Total-step estimation over the quiz graph.
//!
//! The estimate is the length of the longest path from a node to a result:
//! `1` for a result, `1 + max(children)` for a question. A key already on the
//! current DFS path contributes `0`, which bounds the walk on cyclic content.
//! Missing keys also contribute `0`; validation reports them separately.

use std::collections::{HashMap, HashSet};

use tracing::{instrument, trace};

use crate::domain::entities::{Node, Tree};

/// Estimate the worst-case number of steps starting at `start`.
#[instrument(level = "debug", skip(tree))]
pub fn estimate_total_steps(tree: &Tree, start: &str) -> usize {
    let mut visiting = HashSet::new();
    let mut memo = HashMap::new();
    let total = visit(tree, start, &mut visiting, &mut memo);
    trace!(total, "estimated total steps");
    total
}

// Memo entries are only exact for acyclic subgraphs; on a cycle the first
// path to reach a node fixes its value.
fn visit<'t>(
    tree: &'t Tree,
    key: &'t str,
    visiting: &mut HashSet<&'t str>,
    memo: &mut HashMap<&'t str, usize>,
) -> usize {
    if let Some(&depth) = memo.get(key) {
        return depth;
    }
    if visiting.contains(key) {
        trace!(key, "cycle guard hit");
        return 0;
    }

    let depth = match tree.node(key) {
        None => 0,
        Some(Node::Result { .. }) => 1,
        Some(Node::Question { options, .. }) => {
            visiting.insert(key);
            let deepest = options
                .iter()
                .map(|option| visit(tree, option.next.as_str(), visiting, memo))
                .max()
                .unwrap_or(0);
            visiting.remove(key);
            1 + deepest
        }
    };

    memo.insert(key, depth);
    depth
}
