use crate::formula::{Assignment, Formula, Literal, Variable};
use crate::{SatResult, SearchCore, SolveError};
use itertools::Itertools;
use log::debug;

pub const DEFAULT_MAX_VARIABLES: usize = 24;

/// Exhaustive baseline: tries every set of true variables in order of increasing size and returns
/// the first total assignment that satisfies the formula and passes the optional acceptance check.
///
/// Exponential in the number of variables, so formulas above `max_variables` are refused.
pub struct BruteForce<'a> {
    max_variables: usize,
    accept: Option<Box<dyn FnMut(&Assignment) -> bool + 'a>>,
}

impl Default for BruteForce<'_> {
    fn default() -> Self {
        Self {
            max_variables: DEFAULT_MAX_VARIABLES,
            accept: None,
        }
    }
}

impl<'a> BruteForce<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }

    /// Only report models for which `accept` returns true.
    pub fn accepting(mut self, accept: impl FnMut(&Assignment) -> bool + 'a) -> Self {
        self.accept = Some(Box::new(accept));
        self
    }

    pub fn enumerate(&mut self, formula: &Formula) -> Result<SatResult, SolveError> {
        let num_variables = formula.num_variables();
        if num_variables > self.max_variables {
            return Err(SolveError::TooManyVariables {
                variables: num_variables,
                limit: self.max_variables,
            });
        }

        let mut tested = 0usize;
        for size in 0..=num_variables {
            for chosen in (0..num_variables).combinations(size) {
                tested += 1;
                let mut assignment = Assignment::from_bools(std::iter::repeat(false).take(num_variables));
                for v in chosen {
                    assignment.assign(Literal::Positive(Variable(v)));
                }
                if !assignment.satisfies(formula) {
                    continue;
                }
                if let Some(accept) = self.accept.as_mut() {
                    if !accept(&assignment) {
                        continue;
                    }
                }
                debug!("enumeration accepted assignment #{} (weight {})", tested, size);
                return Ok(SatResult::Satisfiable(assignment));
            }
        }
        debug!("enumeration exhausted {} assignments", tested);
        Ok(SatResult::Unsatisfiable)
    }
}

impl SearchCore for BruteForce<'_> {
    fn name(&self) -> &'static str {
        "enumeration"
    }

    fn solve(&mut self, formula: &Formula) -> Result<SatResult, SolveError> {
        self.enumerate(formula)
    }
}
