use crate::cardinality;
use crate::connectivity::is_connected;
use crate::edges::{candidate_edges, CandidateEdge};
use crate::formula::{Assignment, Clause, Formula, Literal, Variable};
use crate::grid::{Island, Position, Puzzle};
use crate::solution::{Bridge, Solution};
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;
use std::str::FromStr;

/// Which of an edge's two variables is meant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Level {
    Single,
    Double,
}

impl Level {
    pub fn weight(self) -> u8 {
        match self {
            Level::Single => 1,
            Level::Double => 2,
        }
    }
}

/// The two decision variables of a candidate edge. At most one is true: `low` alone means one
/// bridge, `high` alone means two, neither means none.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EdgeVars {
    pub low: Variable,
    pub high: Variable,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cardinality {
    /// One clause per wrong weight combination at an island; no auxiliary variables.
    Direct,
    /// Sinz sequential counters over the island's literals, with `high` listed twice.
    SequentialCounter,
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::Direct
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Cardinality::Direct),
            "sequential" | "seqcounter" => Ok(Cardinality::SequentialCounter),
            _ => Err(format!("unknown cardinality encoding '{}'", s)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncoderOptions {
    pub cardinality: Cardinality,
    /// Forbid any bridge between two 1-islands and double bridges between two 2-islands. Both would
    /// close off a pair from the rest of the puzzle, but the rule also rejects a puzzle that consists
    /// of nothing but such a pair.
    pub isolation_pruning: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            cardinality: Cardinality::default(),
            isolation_pruning: true,
        }
    }
}

/// A puzzle translated to CNF, plus the bookkeeping to read models back as bridges.
#[derive(Clone, Debug)]
pub struct Encoding {
    islands: Vec<Island>,
    edges: Vec<CandidateEdge>,
    vars: Vec<EdgeVars>,
    owners: HashMap<Variable, (usize, Level)>,
    formula: Formula,
}

/// Encode the degree, crossing and pruning rules of `puzzle`. Connectivity is not expressible here
/// and is left to [`crate::Refiner`].
pub fn encode(puzzle: &Puzzle, options: &EncoderOptions) -> Encoding {
    let islands = puzzle.islands().to_vec();
    let edges = candidate_edges(puzzle);
    let mut formula = Formula::default();
    let mut owners = HashMap::new();

    // edge i owns variables 2i and 2i + 1
    let vars: Vec<EdgeVars> = edges
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            let low = formula.fresh_variable();
            let high = formula.fresh_variable();
            owners.insert(low, (idx, Level::Single));
            owners.insert(high, (idx, Level::Double));
            EdgeVars { low, high }
        })
        .collect();

    for v in &vars {
        formula.push(Clause::new(vec![Literal::Negative(v.low), Literal::Negative(v.high)]));
    }

    let incident: Vec<Vec<usize>> = islands
        .iter()
        .map(|island| {
            (0..edges.len())
                .filter(|&idx| edges[idx].touches(island.position))
                .collect()
        })
        .collect();

    for (island, at_island) in islands.iter().zip(&incident) {
        let incident_vars: Vec<EdgeVars> = at_island.iter().map(|&idx| vars[idx]).collect();
        match options.cardinality {
            Cardinality::Direct => {
                for clause in cardinality::exactly_weighted(&incident_vars, island.degree) {
                    formula.push(clause);
                }
            }
            Cardinality::SequentialCounter => {
                let literals: Vec<Literal> = incident_vars
                    .iter()
                    .flat_map(|v| vec![Literal::Positive(v.low), Literal::Positive(v.high), Literal::Positive(v.high)])
                    .collect();
                cardinality::exactly(&mut formula, &literals, island.degree as usize);
            }
        }
    }

    let mut crossings = 0;
    for ((i, e), (j, f)) in edges.iter().enumerate().tuple_combinations() {
        if !e.crosses(f) {
            continue;
        }
        crossings += 1;
        for x in [vars[i].low, vars[i].high] {
            for y in [vars[j].low, vars[j].high] {
                formula.push(Clause::new(vec![Literal::Negative(x), Literal::Negative(y)]));
            }
        }
    }

    let degree_of = |position: Position| islands.iter().find(|island| island.position == position).map(|island| island.degree);

    if options.isolation_pruning {
        for (edge, v) in edges.iter().zip(&vars) {
            match (degree_of(edge.a), degree_of(edge.b)) {
                (Some(1), Some(1)) => {
                    formula.push(Clause::new(vec![Literal::Negative(v.low)]));
                    formula.push(Clause::new(vec![Literal::Negative(v.high)]));
                }
                (Some(2), Some(2)) => formula.push(Clause::new(vec![Literal::Negative(v.high)])),
                _ => {}
            }
        }
    }

    // an island asking for twice as many bridges as it has edges needs a double bridge on each
    for (island, at_island) in islands.iter().zip(&incident) {
        if at_island.is_empty() || island.degree as usize != 2 * at_island.len() {
            continue;
        }
        for &idx in at_island {
            formula.push(Clause::new(vec![Literal::Positive(vars[idx].high)]));
            formula.push(Clause::new(vec![Literal::Negative(vars[idx].low)]));
        }
    }

    debug!(
        "encoded {} islands, {} candidate edges ({} crossing pairs) into {} variables and {} clauses",
        islands.len(),
        edges.len(),
        crossings,
        formula.num_variables(),
        formula.num_clauses()
    );

    Encoding {
        islands,
        edges,
        vars,
        owners,
        formula,
    }
}

impl Encoding {
    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn edges(&self) -> &[CandidateEdge] {
        &self.edges
    }

    pub fn edge_vars(&self) -> &[EdgeVars] {
        &self.vars
    }

    /// The edge and level a variable stands for; `None` for auxiliary variables.
    pub fn owner(&self, variable: Variable) -> Option<(usize, Level)> {
        self.owners.get(&variable).copied()
    }

    /// Edge variables that are true in `model`, in variable order.
    pub fn true_edge_literals<'m>(&'m self, model: &'m Assignment) -> impl Iterator<Item = Literal> + 'm {
        self.vars
            .iter()
            .flat_map(|v| [v.low, v.high])
            .filter(move |variable| model.is_true(*variable))
            .map(Literal::Positive)
    }

    /// Read the bridges out of a model. Undecided variables count as false.
    pub fn decode(&self, model: &Assignment) -> Solution {
        let mut weights = vec![0u8; self.edges.len()];
        for literal in self.true_edge_literals(model) {
            if let Some((idx, level)) = self.owner(literal.variable()) {
                weights[idx] = weights[idx].max(level.weight());
            }
        }
        Solution::new(
            self.edges
                .iter()
                .zip(weights)
                .filter(|(_, weight)| *weight > 0)
                .map(|(edge, weight)| Bridge { edge: *edge, weight })
                .collect(),
        )
    }

    /// Whether the bridges of `model` join all islands.
    pub fn connects(&self, model: &Assignment) -> bool {
        let solution = self.decode(model);
        is_connected(
            self.islands.iter().map(|island| island.position),
            solution.bridges().iter().map(|bridge| (bridge.edge.a, bridge.edge.b)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::BruteForce;
    use crate::{SatResult, SearchCore, Solver};
    use test_env_log::test;

    fn encode_str(grid: &str, options: &EncoderOptions) -> (Puzzle, Encoding) {
        let puzzle = Puzzle::parse(grid).unwrap();
        let encoding = encode(&puzzle, options);
        (puzzle, encoding)
    }

    #[test]
    fn allocates_two_variables_per_edge() {
        let (_, encoding) = encode_str("2,2\n2,2", &EncoderOptions::default());
        assert_eq!(encoding.edges().len(), 4);
        assert_eq!(encoding.formula().num_variables(), 8);
        assert_eq!(encoding.owner(Variable(0)), Some((0, Level::Single)));
        assert_eq!(encoding.owner(Variable(5)), Some((2, Level::Double)));
        assert_eq!(encoding.owner(Variable(8)), None);
    }

    #[test]
    fn square_has_single_solution() {
        let (puzzle, encoding) = encode_str("2,2\n2,2", &EncoderOptions::default());
        let model = match BruteForce::new().solve(encoding.formula()).unwrap() {
            SatResult::Satisfiable(model) => model,
            SatResult::Unsatisfiable => panic!("square is solvable"),
        };
        let solution = encoding.decode(&model);
        assert_eq!(solution.bridges().len(), 4);
        assert!(solution.bridges().iter().all(|b| b.weight == 1));
        assert_eq!(solution.verify(&puzzle), Ok(()));
    }

    #[test]
    fn sequential_counter_agrees_with_direct() {
        let grids = ["2,2\n2,2", "1,1", "2,0,3\n0,0,0\n1,0,2", "3,0,3\n0,0,0\n3,0,3", "1,4,1"];
        for grid in grids.iter() {
            let direct = encode_str(grid, &EncoderOptions::default()).1;
            let counter = encode_str(
                grid,
                &EncoderOptions {
                    cardinality: Cardinality::SequentialCounter,
                    ..EncoderOptions::default()
                },
            )
            .1;
            let a = Solver::new().solve(direct.formula());
            let b = Solver::new().solve(counter.formula());
            assert_eq!(a.is_sat(), b.is_sat(), "grid {:?}", grid);
            if let (Some(x), Some(y)) = (a.model(), b.model()) {
                assert_eq!(direct.decode(x).bridges().len(), counter.decode(y).bridges().len());
            }
        }
    }

    #[test]
    fn pair_of_ones_is_pruned() {
        let (_, encoding) = encode_str("1,1", &EncoderOptions::default());
        assert!(!Solver::new().solve(encoding.formula()).is_sat());

        let unpruned = EncoderOptions {
            isolation_pruning: false,
            ..EncoderOptions::default()
        };
        let (puzzle, encoding) = encode_str("1,1", &unpruned);
        let model = Solver::new().solve(encoding.formula()).model().cloned().unwrap();
        assert_eq!(encoding.decode(&model).verify(&puzzle), Ok(()));
    }

    #[test]
    fn pair_of_twos_cannot_double() {
        let (_, encoding) = encode_str("2,2", &EncoderOptions::default());
        assert!(!Solver::new().solve(encoding.formula()).is_sat());
    }

    #[test]
    fn crossing_edges_exclude_each_other() {
        // the two 1-1 lines cross in the middle, and pruning is off so each could carry a bridge
        let options = EncoderOptions {
            isolation_pruning: false,
            ..EncoderOptions::default()
        };
        let (_, encoding) = encode_str("0,1,0\n1,0,1\n0,1,0", &options);
        assert_eq!(encoding.edges().len(), 2);
        assert!(encoding.edges()[0].crosses(&encoding.edges()[1]));
        assert!(!BruteForce::new().solve(encoding.formula()).unwrap().is_sat());
    }

    #[test]
    fn saturated_island_forces_double_bridges() {
        let (puzzle, encoding) = encode_str("0,2,0\n2,8,2\n0,2,0", &EncoderOptions::default());
        let model = Solver::new().solve(encoding.formula()).model().cloned().unwrap();
        let solution = encoding.decode(&model);
        assert_eq!(solution.bridges().len(), 4);
        assert!(solution.bridges().iter().all(|b| b.weight == 2));
        assert_eq!(solution.degree(Position::new(1, 1)), 8);
        // the outer islands are only reachable through the centre
        assert_eq!(solution.verify(&puzzle), Ok(()));
    }

    #[test]
    fn island_without_edges_is_unsat() {
        let (_, encoding) = encode_str("1,0\n0,1", &EncoderOptions::default());
        assert!(encoding.edges().is_empty());
        assert!(!Solver::new().solve(encoding.formula()).is_sat());
    }

    #[test]
    fn decode_reads_levels() {
        let (_, encoding) = encode_str("3,0,3\n0,0,0\n3,0,3", &EncoderOptions::default());
        // edges: top, left, right, bottom; top double, left single
        let mut model = Assignment::new(encoding.formula().num_variables());
        model.assign(Literal::Positive(encoding.edge_vars()[0].high));
        model.assign(Literal::Positive(encoding.edge_vars()[1].low));
        let solution = encoding.decode(&model);
        assert_eq!(solution.bridges().len(), 2);
        assert_eq!(solution.bridges()[0].weight, 2);
        assert_eq!(solution.bridges()[1].weight, 1);
        assert!(!encoding.connects(&model));
    }
}
