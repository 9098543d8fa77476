use crate::encoder::Encoding;
use crate::engine::SearchCore;
use crate::formula::{Assignment, Clause, Formula, Literal, Value, Variable};
use crate::solution::Solution;
use crate::{SatResult, SolveError};
use log::{debug, info};
use std::str::FromStr;

/// How a model whose bridges leave the islands disconnected is excluded before the next search.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Blocking {
    /// Negate the true edge variables only: that exact bridge layout is ruled out, whatever the
    /// auxiliary variables were.
    Tight,
    /// Negate the whole model over every variable of the formula.
    Loose,
}

impl Default for Blocking {
    fn default() -> Self {
        Blocking::Tight
    }
}

impl FromStr for Blocking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tight" => Ok(Blocking::Tight),
            "loose" => Ok(Blocking::Loose),
            _ => Err(format!("unknown blocking strategy '{}'", s)),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Outcome {
    Solved(Solution),
    NoSolution,
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            Outcome::NoSolution => None,
        }
    }
}

/// Generate-test-refine: ask the core for a model, keep it if its bridges connect every island,
/// otherwise append a clause excluding it and ask again.
///
/// The refiner owns the session's formula. It starts as a copy of the encoding's and only grows.
pub struct Refiner<'e, C> {
    encoding: &'e Encoding,
    core: C,
    formula: Formula,
    blocking: Blocking,
    max_iterations: Option<usize>,
    iterations: usize,
}

impl<'e, C: SearchCore> Refiner<'e, C> {
    pub fn new(encoding: &'e Encoding, core: C) -> Self {
        Self::resume(encoding, core, encoding.formula().clone())
    }

    /// Continue from a formula an earlier session already strengthened.
    pub fn resume(encoding: &'e Encoding, core: C, formula: Formula) -> Self {
        Self {
            encoding,
            core,
            formula,
            blocking: Blocking::default(),
            max_iterations: None,
            iterations: 0,
        }
    }

    pub fn blocking(mut self, blocking: Blocking) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn run(&mut self) -> Result<Outcome, SolveError> {
        loop {
            if let Some(limit) = self.max_iterations {
                if self.iterations >= limit {
                    return Err(SolveError::IterationLimit(limit));
                }
            }
            self.iterations += 1;

            let model = match self.core.solve(&self.formula)? {
                SatResult::Unsatisfiable => {
                    info!(
                        "{}: no connected model after {} iterations",
                        self.core.name(),
                        self.iterations
                    );
                    return Ok(Outcome::NoSolution);
                }
                SatResult::Satisfiable(model) => model,
            };

            let solution = self.encoding.decode(&model);
            if self.encoding.connects(&model) {
                info!(
                    "{}: connected model with {} bridges after {} iterations",
                    self.core.name(),
                    solution.bridges().len(),
                    self.iterations
                );
                return Ok(Outcome::Solved(solution));
            }

            let clause = self.blocking_clause(&model);
            debug!(
                "iteration {}: {} bridges leave islands disconnected, blocking with {} literals",
                self.iterations,
                solution.bridges().len(),
                clause.len()
            );
            self.formula.push(clause);
        }
    }

    fn blocking_clause(&self, model: &Assignment) -> Clause {
        match self.blocking {
            Blocking::Tight => Clause::new(self.encoding.true_edge_literals(model).map(|l| l.negated())),
            Blocking::Loose => {
                let total = model.completed();
                Clause::new(
                    (0..self.formula.num_variables())
                        .map(Variable)
                        .map(|v| Literal::new(v, total.get(v) != Value::True)),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::best_first::BestFirst;
    use crate::brute_force::BruteForce;
    use crate::encoder::{encode, Cardinality, EncoderOptions};
    use crate::engine::Varisat;
    use crate::grid::Puzzle;
    use crate::Solver;
    use test_env_log::test;

    const CORNERS: &str = "2,0,3\n0,0,0\n1,0,2";
    const FRAME: &str = "3,0,4,0,3\n0,0,0,0,0\n3,0,1,0,3\n0,0,0,0,0\n3,0,0,0,2";

    fn puzzle(grid: &str) -> Puzzle {
        Puzzle::parse(grid).unwrap()
    }

    #[test]
    fn square_is_solved_with_single_bridges() {
        let p = puzzle("2,2\n2,2");
        let encoding = encode(&p, &EncoderOptions::default());
        let outcome = Refiner::new(&encoding, Solver::new()).run().unwrap();
        let solution = outcome.solution().expect("square is solvable");
        assert_eq!(solution.bridges().len(), 4);
        assert!(solution.bridges().iter().all(|b| b.weight == 1));
        assert_eq!(solution.verify(&p), Ok(()));
    }

    #[test]
    fn pair_of_ones_has_no_solution() {
        let p = puzzle("1,1");
        let encoding = encode(&p, &EncoderOptions::default());
        let mut refiner = Refiner::new(&encoding, Solver::new());
        assert_eq!(refiner.run().unwrap(), Outcome::NoSolution);
        assert_eq!(refiner.iterations(), 1);
    }

    #[test]
    fn disconnected_models_are_blocked() {
        // two 1-1 pairs side by side: every model pairs them up and leaves two components
        let p = puzzle("1,0,1\n0,0,0\n1,0,1");
        let options = EncoderOptions {
            isolation_pruning: false,
            ..EncoderOptions::default()
        };
        let encoding = encode(&p, &options);
        for blocking in [Blocking::Tight, Blocking::Loose] {
            let mut refiner = Refiner::new(&encoding, Solver::new()).blocking(blocking);
            assert_eq!(refiner.run().unwrap(), Outcome::NoSolution);
            assert_eq!(refiner.iterations(), 3);
            assert_eq!(refiner.formula().num_clauses(), encoding.formula().num_clauses() + 2);
        }
    }

    #[test]
    fn refinement_reaches_a_connected_layout() {
        // without pruning the corners can pair up with double bridges (two true variables each
        // time), which enumeration finds before the ring of single bridges
        let p = puzzle("2,0,2\n0,0,0\n2,0,2");
        let options = EncoderOptions {
            isolation_pruning: false,
            ..EncoderOptions::default()
        };
        let encoding = encode(&p, &options);
        for blocking in [Blocking::Tight, Blocking::Loose] {
            let mut refiner = Refiner::new(&encoding, BruteForce::new()).blocking(blocking);
            let outcome = refiner.run().unwrap();
            let solution = outcome.solution().expect("the ring connects");
            assert_eq!(refiner.iterations(), 3);
            assert!(solution.bridges().iter().all(|b| b.weight == 1));
            assert_eq!(solution.verify(&p), Ok(()));
        }
    }

    #[test]
    fn every_core_solves_the_same_puzzle() {
        let p = puzzle(CORNERS);
        let encoding = encode(&p, &EncoderOptions::default());

        let cores: Vec<Box<dyn SearchCore + '_>> = vec![
            Box::new(Solver::new()),
            Box::new(BestFirst::new()),
            Box::new(Varisat::new()),
            Box::new(BruteForce::new().accepting(|m: &Assignment| encoding.connects(m))),
        ];
        for core in cores {
            let name = core.name();
            let outcome = Refiner::new(&encoding, core).run().unwrap();
            let solution = outcome.solution().unwrap_or_else(|| panic!("{} found nothing", name));
            assert_eq!(solution.verify(&p), Ok(()), "{}", name);
        }
    }

    #[test]
    fn search_cores_solve_a_larger_frame() {
        let p = puzzle(FRAME);
        let encoding = encode(&p, &EncoderOptions::default());

        for blocking in [Blocking::Tight, Blocking::Loose] {
            let cores: Vec<Box<dyn SearchCore>> =
                vec![Box::new(Solver::new()), Box::new(BestFirst::new()), Box::new(Varisat::new())];
            for core in cores {
                let name = core.name();
                let outcome = Refiner::new(&encoding, core).blocking(blocking).run().unwrap();
                let solution = outcome.solution().unwrap_or_else(|| panic!("{} found nothing", name));
                assert_eq!(solution.verify(&p), Ok(()), "{} {:?}", name, blocking);
            }
        }
    }

    #[test]
    fn sequential_counter_with_tight_blocking() {
        let p = puzzle(FRAME);
        let options = EncoderOptions {
            cardinality: Cardinality::SequentialCounter,
            ..EncoderOptions::default()
        };
        let encoding = encode(&p, &options);
        let outcome = Refiner::new(&encoding, Varisat::new()).run().unwrap();
        assert_eq!(outcome.solution().unwrap().verify(&p), Ok(()));
    }

    #[test]
    fn rerun_on_strengthened_formula_is_stable() {
        let p = puzzle(FRAME);
        let encoding = encode(&p, &EncoderOptions::default());
        let mut first = Refiner::new(&encoding, Solver::new());
        let outcome = first.run().unwrap();

        let mut second = Refiner::resume(&encoding, Solver::new(), first.formula().clone());
        assert_eq!(second.run().unwrap(), outcome);
        assert_eq!(second.iterations(), 1);
    }

    #[test]
    fn iteration_limit_is_reported() {
        let p = puzzle("1,0,1\n0,0,0\n1,0,1");
        let options = EncoderOptions {
            isolation_pruning: false,
            ..EncoderOptions::default()
        };
        let encoding = encode(&p, &options);
        let result = Refiner::new(&encoding, Solver::new()).max_iterations(Some(1)).run();
        assert!(matches!(result, Err(SolveError::IterationLimit(1))));
    }
}
