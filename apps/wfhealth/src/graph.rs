//! Dependency-cycle detection with a readable witness path.
//!
//! Three-colour depth-first search in caller order. Only the first cycle
//! reached is returned.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unseen,
    Visiting,
    Done,
}

/// Return one closed walk (first == last) through a cycle, or `None`.
///
/// `edges` maps a node to the nodes it depends on. Edges to nodes outside
/// `nodes` should be filtered by the caller; they are walked like any other.
pub fn detect_cycle<N: AsRef<str>>(
    nodes: &[N],
    edges: &HashMap<String, Vec<String>>,
) -> Option<Vec<String>> {
    let mut marks: HashMap<&str, Mark> = nodes
        .iter()
        .map(|n| (n.as_ref(), Mark::Unseen))
        .collect();
    let mut parent: HashMap<&str, &str> = HashMap::new();

    for root in nodes {
        let root = root.as_ref();
        if marks.get(root).copied().unwrap_or(Mark::Unseen) != Mark::Unseen {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        // (node, index of the next edge to follow)
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let next = edges.get(node).and_then(|targets| targets.get(frame.1));
            match next {
                Some(target) => {
                    frame.1 += 1;
                    let target = target.as_str();
                    match marks.get(target).copied().unwrap_or(Mark::Unseen) {
                        Mark::Unseen => {
                            parent.insert(target, node);
                            marks.insert(target, Mark::Visiting);
                            stack.push((target, 0));
                        }
                        Mark::Visiting => return Some(witness(&parent, node, target)),
                        Mark::Done => {}
                    }
                }
                None => {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }
    }
    None
}

/// Walk parents back from `from` to `target`, then reverse into edge order.
fn witness(parent: &HashMap<&str, &str>, from: &str, target: &str) -> Vec<String> {
    let mut chain = vec![target.to_string()];
    let mut cur = from;
    while cur != target {
        let Some(&up) = parent.get(cur) else { break };
        chain.push(cur.to_string());
        cur = up;
    }
    chain.push(target.to_string());
    chain.reverse();
    chain
}
