use crate::formula::{Assignment, ClauseState, Formula, Literal, Value, Variable};
use crate::propagate::simplify;
use crate::SatResult;
use log::{debug, trace};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BestFirstStats {
    pub expanded: usize,
    pub pushed: usize,
    pub pruned: usize,
    pub revisited: usize,
}

/// Best-first search over partial assignments.
///
/// Nodes are ordered by `g + h`, where `g` counts the decisions made so far and `h` is the number of
/// undecided variables plus the number of clauses not yet satisfied. The estimate is cheap rather
/// than admissible. Every node is simplified by unit propagation and pure-literal elimination before
/// it is queued, and nodes whose simplification hits a conflict are dropped.
#[derive(Debug, Default)]
pub struct BestFirst {
    stats: BestFirstStats,
}

#[derive(Debug, PartialEq, Eq)]
struct Node {
    assignment: Assignment,
    /// Clauses not yet satisfied by `assignment`.
    remaining: Vec<usize>,
    decisions: usize,
}

impl Node {
    fn heuristic(&self) -> usize {
        self.assignment.num_undecided() + self.remaining.len()
    }

    fn priority(&self) -> usize {
        self.decisions + self.heuristic()
    }
}

/// Heap entry; ties on priority go to the node queued first.
#[derive(Debug, PartialEq, Eq)]
struct Queued {
    priority: usize,
    sequence: usize,
    node: Node,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.sequence).cmp(&(other.priority, other.sequence))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl BestFirst {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> BestFirstStats {
        self.stats
    }

    pub fn solve(&mut self, formula: &Formula) -> SatResult {
        let live: Vec<usize> = (0..formula.num_clauses()).collect();
        let root = match settle(formula, &live, Assignment::new(formula.num_variables()), 0) {
            Some(node) => node,
            None => {
                debug!("conflict before any decision");
                return SatResult::Unsatisfiable;
            }
        };

        let mut frontier = BinaryHeap::new();
        let mut visited = HashSet::new();
        let mut sequence = 0;
        frontier.push(Reverse(Queued {
            priority: root.priority(),
            sequence,
            node: root,
        }));
        self.stats.pushed += 1;

        let result = loop {
            let node = match frontier.pop() {
                None => break SatResult::Unsatisfiable,
                Some(Reverse(queued)) => queued.node,
            };
            if !visited.insert(node.assignment.clone()) {
                self.stats.revisited += 1;
                continue;
            }
            self.stats.expanded += 1;

            if node.remaining.is_empty() {
                break SatResult::Satisfiable(node.assignment);
            }

            let variable = match branch_variable(formula, &node) {
                Some(variable) => variable,
                // an open clause with nothing undecided would have been a conflict in settle()
                None => continue,
            };
            trace!("expanding at g = {} on {:?}", node.decisions, variable);

            for positive in [true, false] {
                let mut assignment = node.assignment.clone();
                assignment.assign(Literal::new(variable, positive));
                match settle(formula, &node.remaining, assignment, node.decisions + 1) {
                    Some(child) => {
                        sequence += 1;
                        self.stats.pushed += 1;
                        frontier.push(Reverse(Queued {
                            priority: child.priority(),
                            sequence,
                            node: child,
                        }));
                    }
                    None => self.stats.pruned += 1,
                }
            }
        };
        debug!("best-first core finished: {:?}", self.stats);
        result
    }
}

/// Simplify `assignment` against the `live` clauses; `None` on conflict.
fn settle(formula: &Formula, live: &[usize], mut assignment: Assignment, decisions: usize) -> Option<Node> {
    let mut trail = vec![];
    simplify(formula, live, &mut assignment, &mut trail).ok()?;
    let remaining = live
        .iter()
        .copied()
        .filter(|&idx| assignment.evaluate(formula.clause(idx)) != ClauseState::Satisfied)
        .collect();
    Some(Node {
        assignment,
        remaining,
        decisions,
    })
}

fn branch_variable(formula: &Formula, node: &Node) -> Option<Variable> {
    node.remaining
        .iter()
        .flat_map(|&idx| formula.clause(idx).literals())
        .map(|literal| literal.variable())
        .filter(|variable| node.assignment.get(*variable) == Value::Undecided)
        .min()
}
