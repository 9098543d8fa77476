//! The seam between the refinement loop and whatever decides satisfiability.

use crate::best_first::BestFirst;
use crate::formula::{Assignment, Formula, Literal, Variable};
use crate::solver::Solver;
use crate::{SatResult, SolveError};
use log::debug;
use varisat::{ExtendFormula, Lit, Var};

/// Anything that can find a model of a [`Formula`].
///
/// The refinement loop only ever appends clauses between calls, so an incremental engine may keep
/// its state and feed itself just the clauses past the [`Formula::version`] it saw last.
pub trait SearchCore {
    fn name(&self) -> &'static str;

    fn solve(&mut self, formula: &Formula) -> Result<SatResult, SolveError>;
}

impl<T: SearchCore + ?Sized> SearchCore for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&mut self, formula: &Formula) -> Result<SatResult, SolveError> {
        (**self).solve(formula)
    }
}

impl SearchCore for Solver {
    fn name(&self) -> &'static str {
        "resolution"
    }

    fn solve(&mut self, formula: &Formula) -> Result<SatResult, SolveError> {
        Ok(Solver::solve(self, formula))
    }
}

impl SearchCore for BestFirst {
    fn name(&self) -> &'static str {
        "best-first"
    }

    fn solve(&mut self, formula: &Formula) -> Result<SatResult, SolveError> {
        Ok(BestFirst::solve(self, formula))
    }
}

/// Incremental CDCL search through `varisat`.
pub struct Varisat<'a> {
    solver: varisat::Solver<'a>,
    fed: usize,
}

impl Default for Varisat<'_> {
    fn default() -> Self {
        Self {
            solver: varisat::Solver::new(),
            fed: 0,
        }
    }
}

impl Varisat<'_> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_lit(literal: &Literal) -> Lit {
    Var::from_index(literal.idx()).lit(literal.is_positive())
}

impl SearchCore for Varisat<'_> {
    fn name(&self) -> &'static str {
        "varisat"
    }

    fn solve(&mut self, formula: &Formula) -> Result<SatResult, SolveError> {
        if formula.version() < self.fed {
            return Err(SolveError::FormulaRewound {
                seen: self.fed,
                now: formula.version(),
            });
        }
        let fresh = formula.clauses_since(self.fed);
        debug!("feeding varisat {} new clauses", fresh.len());
        for clause in fresh {
            let lits: Vec<Lit> = clause.literals().map(to_lit).collect();
            self.solver.add_clause(&lits);
        }
        self.fed = formula.version();

        let satisfiable = self
            .solver
            .solve()
            .map_err(|e| SolveError::Backend(format!("{:?}", e)))?;
        if !satisfiable {
            return Ok(SatResult::Unsatisfiable);
        }

        let model = self
            .solver
            .model()
            .ok_or_else(|| SolveError::Backend("no model after a satisfiable result".into()))?;
        let mut assignment = Assignment::new(formula.num_variables());
        for lit in model {
            if lit.var().index() < formula.num_variables() {
                assignment.assign(Literal::new(Variable(lit.var().index()), lit.is_positive()));
            }
        }
        Ok(SatResult::Satisfiable(assignment))
    }
}
