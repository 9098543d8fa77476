use crate::formula::{Assignment, ClauseState, Formula, Literal, Value, Variable};
use crate::propagate::{simplify, Conflict};
use crate::SatResult;
use log::{debug, trace};

/// Counters accumulated across every [`Solver::solve`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SolverStats {
    pub decisions: usize,
    pub implied: usize,
    pub pure: usize,
    pub conflicts: usize,
}

/// Resolution-style search: unit propagation, pure-literal elimination and chronological
/// branch-and-backtrack, branching true-first on the lowest-indexed open variable.
#[derive(Debug, Default)]
pub struct Solver {
    stats: SolverStats,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    pub fn solve(&mut self, formula: &Formula) -> SatResult {
        let mut state = SolverState::new(formula);

        if state.propagate(&mut self.stats).is_err() {
            debug!("conflict before any decision");
            return SatResult::Unsatisfiable;
        }
        let result = loop {
            let variable = match state.decide() {
                None => break SatResult::Satisfiable(state.assignment.clone()),
                Some(variable) => variable,
            };
            self.stats.decisions += 1;
            state.frames.push(Frame {
                variable,
                trail_mark: state.trail.len(),
                flipped: false,
            });
            state.assign(Literal::Positive(variable));

            let mut unsatisfiable = false;
            while let Err(Conflict(idx)) = state.propagate(&mut self.stats) {
                self.stats.conflicts += 1;
                trace!("conflict in clause {}", idx);
                if !state.backtrack() {
                    unsatisfiable = true;
                    break;
                }
            }
            if unsatisfiable {
                break SatResult::Unsatisfiable;
            }
        };
        debug!("resolution core finished: {:?}", self.stats);
        result
    }
}

/// A branch point: the decided variable and the trail length before it was assigned.
#[derive(Debug, Clone, Copy)]
struct Frame {
    variable: Variable,
    trail_mark: usize,
    flipped: bool,
}

#[derive(Debug)]
struct SolverState<'f> {
    formula: &'f Formula,
    live: Vec<usize>,
    assignment: Assignment,
    trail: Vec<Variable>,
    frames: Vec<Frame>,
}

impl<'f> SolverState<'f> {
    fn new(formula: &'f Formula) -> Self {
        Self {
            formula,
            live: (0..formula.num_clauses()).collect(),
            assignment: Assignment::new(formula.num_variables()),
            trail: vec![],
            frames: vec![],
        }
    }

    fn assign(&mut self, literal: Literal) {
        debug_assert_eq!(self.assignment.get(literal.variable()), Value::Undecided);
        trace!("decision {} at level {}", literal, self.frames.len());
        self.assignment.assign(literal);
        self.trail.push(literal.variable());
    }

    fn propagate(&mut self, stats: &mut SolverStats) -> Result<(), Conflict> {
        let counts = simplify(self.formula, &self.live, &mut self.assignment, &mut self.trail)?;
        stats.implied += counts.implied;
        stats.pure += counts.pure;
        Ok(())
    }

    /// Lowest undecided variable of any unsatisfied clause, or `None` once every clause is satisfied.
    fn decide(&self) -> Option<Variable> {
        self.live
            .iter()
            .map(|&idx| self.formula.clause(idx))
            .filter(|clause| self.assignment.evaluate(clause) != ClauseState::Satisfied)
            .flat_map(|clause| clause.literals())
            .map(|literal| literal.variable())
            .filter(|variable| self.assignment.get(*variable) == Value::Undecided)
            .min()
    }

    fn undo_to(&mut self, mark: usize) {
        for variable in self.trail.drain(mark..) {
            self.assignment.set(variable, Value::Undecided);
        }
    }

    /// Unwind to the most recent decision still holding its first value and flip it.
    /// Returns false when no such decision is left.
    fn backtrack(&mut self) -> bool {
        while let Some(frame) = self.frames.pop() {
            trace!(
                "backtrack: dropping to {} from {}",
                frame.trail_mark,
                self.trail.len()
            );
            self.undo_to(frame.trail_mark);
            if !frame.flipped {
                self.frames.push(Frame { flipped: true, ..frame });
                self.assign(Literal::Negative(frame.variable));
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::BruteForce;
    use crate::formula::{formula_strategy, n, p, Clause};
    use crate::SearchCore;
    use proptest::prelude::*;
    use test_env_log::test;

    fn solve(f: &Formula) -> SatResult {
        Solver::new().solve(f)
    }

    #[test]
    fn solve_bcp_sat() {
        let c1 = Clause::new(vec![p(0), p(1)]);
        let c2 = Clause::new(vec![n(0)]);
        let f = Formula::new(vec![c1, c2]);

        assert_eq!(solve(&f), SatResult::Satisfiable(Assignment::from_bools(vec![false, true])));
    }

    #[test]
    fn solve_bcp_unsat() {
        let c1 = Clause::new(vec![p(0), p(1)]);
        let c2 = Clause::new(vec![n(0)]);
        let c3 = Clause::new(vec![n(1)]);
        let f = Formula::new(vec![c1, c2, c3]);

        assert_eq!(solve(&f), SatResult::Unsatisfiable);
    }

    #[test]
    fn solve_conflict_sat() {
        let c1 = Clause::new(vec![p(0), p(1), p(2)]);
        let c2 = Clause::new(vec![n(0), n(1), p(2)]);
        let c3 = Clause::new(vec![n(1), n(2)]);
        let f = Formula::new(vec![c1, c2, c3]);

        let model = solve(&f).model().cloned().expect("satisfiable");
        assert!(model.satisfies(&f));
    }

    #[test]
    fn solve_needs_backtracking() {
        // no pure literals anywhere, so the first decision (0 = true) must be undone
        let f = Formula::new(vec![
            Clause::new(vec![n(0), p(1)]),
            Clause::new(vec![n(0), n(1)]),
            Clause::new(vec![p(0), p(1)]),
            Clause::new(vec![p(0), n(1), p(2)]),
            Clause::new(vec![n(2), p(1)]),
        ]);

        let mut solver = Solver::new();
        let model = solver.solve(&f).model().cloned().expect("satisfiable");
        assert!(model.satisfies(&f));
        assert_eq!(model.get(Variable(0)), Value::False);
        assert!(solver.stats().conflicts >= 1);
    }

    #[test]
    fn solve_pigeonhole_unsat() {
        // three pigeons, two holes: x(i, h) = 2 * i + h
        let x = |i: usize, h: usize| 2 * i + h;
        let mut clauses = vec![];
        for i in 0..3 {
            clauses.push(Clause::new(vec![p(x(i, 0)), p(x(i, 1))]));
        }
        for h in 0..2 {
            for i in 0..3 {
                for j in i + 1..3 {
                    clauses.push(Clause::new(vec![n(x(i, h)), n(x(j, h))]));
                }
            }
        }
        assert_eq!(solve(&Formula::new(clauses)), SatResult::Unsatisfiable);
    }

    #[test]
    fn empty_clause_is_unsat() {
        let f = Formula::new(vec![Clause::new(vec![p(0)]), Clause::new(vec![])]);
        assert_eq!(solve(&f), SatResult::Unsatisfiable);
    }

    #[test]
    fn empty_formula_is_sat() {
        assert!(solve(&Formula::default()).is_sat());
    }

    #[test]
    fn solve_simple() {
        // (!0 | !0 | !0) & (!0 | !1 | !1) & (!1 | 2 | 3) & (!1 | 3 | 3)
        let c1 = Clause::new(vec![n(0), n(0), n(0)]);
        let c2 = Clause::new(vec![n(0), n(1), n(1)]);
        let c3 = Clause::new(vec![n(1), p(2), p(3)]);
        let c4 = Clause::new(vec![n(1), p(3), n(3)]);
        let f = Formula::new(vec![c1, c2, c3, c4]);

        assert!(solve(&f).is_sat());
    }

    #[test]
    fn deterministic_models() {
        let f = Formula::new(vec![
            Clause::new(vec![p(0), p(1), p(2)]),
            Clause::new(vec![n(0), n(1)]),
            Clause::new(vec![n(1), n(2)]),
            Clause::new(vec![n(0), n(2)]),
            Clause::new(vec![p(0), n(1), p(2)]),
        ]);
        assert_eq!(solve(&f), solve(&f));
    }

    proptest! {
        #[test]
        fn proptest_agrees_with_brute_force(f in formula_strategy(10, 20)) {
            let brute_force = BruteForce::new().solve(&f).unwrap();
            let result = solve(&f);
            prop_assert_eq!(result.is_sat(), brute_force.is_sat());
            if let Some(model) = result.model() {
                prop_assert!(model.satisfies(&f));
            }
        }
    }
}
