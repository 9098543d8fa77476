//! Unit propagation and pure-literal elimination over a live subset of a formula's clauses.
//!
//! Neither routine rewrites clauses. A clause counts as simplified by reading it through the
//! current [`Assignment`], and every variable set here is pushed onto `trail` so the caller can
//! undo the work by resetting those variables.

use crate::formula::{Assignment, ClauseState, Formula, Literal, Value, Variable};
use log::trace;
use std::collections::HashMap;

/// Index of a clause whose literals are all false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Conflict(pub(crate) usize);

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counts {
    pub(crate) implied: usize,
    pub(crate) pure: usize,
}

/// Assign unit literals until a fixpoint or a conflict.
pub(crate) fn unit_propagate(
    formula: &Formula,
    live: &[usize],
    assignment: &mut Assignment,
    trail: &mut Vec<Variable>,
) -> Result<usize, Conflict> {
    let mut implied = 0;
    let mut did_work = true;
    while did_work {
        did_work = false;
        for &idx in live {
            match assignment.evaluate(formula.clause(idx)) {
                ClauseState::Satisfied | ClauseState::Open => {}
                ClauseState::Conflict => return Err(Conflict(idx)),
                ClauseState::Unit(literal) => {
                    trace!("implied({}) {}", idx, literal);
                    assignment.assign(literal);
                    trail.push(literal.variable());
                    implied += 1;
                    did_work = true;
                }
            }
        }
    }
    Ok(implied)
}

/// Assign every variable that occurs with a single polarity across the unsatisfied live clauses.
pub(crate) fn eliminate_pure(
    formula: &Formula,
    live: &[usize],
    assignment: &mut Assignment,
    trail: &mut Vec<Variable>,
) -> usize {
    // Some(polarity) while only one polarity has been seen, None once both have
    let mut polarity: HashMap<Variable, Option<bool>> = HashMap::new();
    for &idx in live {
        let clause = formula.clause(idx);
        if assignment.evaluate(clause) == ClauseState::Satisfied {
            continue;
        }
        for literal in clause.literals() {
            if assignment.get(literal.variable()) != Value::Undecided {
                continue;
            }
            polarity
                .entry(literal.variable())
                .and_modify(|seen| {
                    if *seen != Some(literal.is_positive()) {
                        *seen = None;
                    }
                })
                .or_insert(Some(literal.is_positive()));
        }
    }

    let mut pure: Vec<Literal> = polarity
        .into_iter()
        .filter_map(|(variable, seen)| seen.map(|positive| Literal::new(variable, positive)))
        .collect();
    pure.sort_by_key(|literal| literal.variable());

    for literal in &pure {
        trace!("pure {}", literal);
        assignment.assign(*literal);
        trail.push(literal.variable());
    }
    pure.len()
}

/// Alternate unit propagation and pure-literal elimination until neither makes progress.
pub(crate) fn simplify(
    formula: &Formula,
    live: &[usize],
    assignment: &mut Assignment,
    trail: &mut Vec<Variable>,
) -> Result<Counts, Conflict> {
    let mut counts = Counts::default();
    loop {
        counts.implied += unit_propagate(formula, live, assignment, trail)?;
        let pure = eliminate_pure(formula, live, assignment, trail);
        if pure == 0 {
            return Ok(counts);
        }
        counts.pure += pure;
    }
}
