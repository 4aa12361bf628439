//! Waits-for graph used to detect dependency cycles.

use std::collections::{HashMap, HashSet, VecDeque};

/// Edges `from -> to` meaning "the resolver of `from` is waiting on `to`".
///
/// A resolver awaiting several paths at once holds several edges; the same
/// edge may be held more than once, so edges are counted.
#[derive(Debug, Default)]
pub(crate) struct WaitGraph {
    edges: HashMap<String, HashMap<String, usize>>,
}

impl WaitGraph {
    pub(crate) fn add(&mut self, from: &str, to: &str) {
        *self
            .edges
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_default() += 1;
    }

    pub(crate) fn remove(&mut self, from: &str, to: &str) {
        let Some(targets) = self.edges.get_mut(from) else {
            return;
        };
        if let Some(count) = targets.get_mut(to) {
            *count -= 1;
            if *count == 0 {
                targets.remove(to);
            }
        }
        if targets.is_empty() {
            self.edges.remove(from);
        }
    }

    /// The loop that adding `from -> to` would close, if any.
    ///
    /// The result starts at `from`, follows the new edge and the shortest
    /// existing route back, and ends at `from` again.
    pub(crate) fn cycle_through(&self, from: &str, to: &str) -> Option<Vec<String>> {
        if from == to {
            return Some(vec![from.to_string(), to.to_string()]);
        }
        let mut parents: HashMap<&str, &str> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::from([to]);
        let mut queue = VecDeque::from([to]);
        while let Some(node) = queue.pop_front() {
            let Some(targets) = self.edges.get(node) else {
                continue;
            };
            let mut next: Vec<&str> = targets.keys().map(String::as_str).collect();
            next.sort_unstable();
            for target in next {
                if !seen.insert(target) {
                    continue;
                }
                parents.insert(target, node);
                if target == from {
                    return Some(Self::trace(from, to, &parents));
                }
                queue.push_back(target);
            }
        }
        None
    }

    fn trace<'a>(
        from: &'a str,
        to: &str,
        parents: &HashMap<&'a str, &'a str>,
    ) -> Vec<String> {
        let mut back = vec![from];
        let mut cursor = from;
        while cursor != to {
            match parents.get(cursor) {
                Some(&parent) => {
                    cursor = parent;
                    back.push(cursor);
                }
                None => break,
            }
        }
        let mut cycle = vec![from.to_string()];
        cycle.extend(back.into_iter().rev().map(str::to_string));
        cycle
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
