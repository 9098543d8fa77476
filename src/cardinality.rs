//! Cardinality constraints as clauses.

use crate::encoder::EdgeVars;
use crate::formula::{Clause, Formula, Literal, Variable};
use itertools::Itertools;

/// Clauses forcing the weights of `edges` (0, 1 via `low`, 2 via `high`) to sum to exactly `target`,
/// without auxiliary variables. Every weight tuple with the wrong sum is ruled out by one clause, so
/// this is only meant for the handful of edges that meet at one island. Relies on `low` and `high`
/// being mutually exclusive.
pub(crate) fn exactly_weighted(edges: &[EdgeVars], target: u8) -> Vec<Clause> {
    if edges.is_empty() {
        return if target == 0 { vec![] } else { vec![Clause::new(vec![])] };
    }
    itertools::repeat_n(0..=2u8, edges.len())
        .multi_cartesian_product()
        .filter(|weights| weights.iter().sum::<u8>() != target)
        .map(|weights| {
            Clause::new(edges.iter().zip(weights).flat_map(|(vars, weight)| {
                let (low, high) = match weight {
                    0 => (true, true),
                    1 => (false, true),
                    _ => (true, false),
                };
                vec![Literal::new(vars.low, low), Literal::new(vars.high, high)]
            }))
        })
        .collect()
}

/// Sequential counter: at most `k` of `literals` are true. Repeated literals count once per
/// occurrence.
pub(crate) fn at_most(formula: &mut Formula, literals: &[Literal], k: usize) {
    let n = literals.len();
    if k >= n {
        return;
    }
    if k == 0 {
        for literal in literals {
            formula.push(Clause::new(vec![literal.negated()]));
        }
        return;
    }

    // s[i][j]: at least j + 1 of literals[0..=i] are true
    let s: Vec<Vec<Variable>> = (0..n - 1)
        .map(|_| (0..k).map(|_| formula.fresh_variable()).collect())
        .collect();
    let pos = Literal::Positive;
    let neg = Literal::Negative;

    formula.push(Clause::new(vec![literals[0].negated(), pos(s[0][0])]));
    for j in 1..k {
        formula.push(Clause::new(vec![neg(s[0][j])]));
    }
    for i in 1..n - 1 {
        let x = literals[i].negated();
        formula.push(Clause::new(vec![x, pos(s[i][0])]));
        for j in 0..k {
            formula.push(Clause::new(vec![neg(s[i - 1][j]), pos(s[i][j])]));
        }
        for j in 1..k {
            formula.push(Clause::new(vec![x, neg(s[i - 1][j - 1]), pos(s[i][j])]));
        }
        formula.push(Clause::new(vec![x, neg(s[i - 1][k - 1])]));
    }
    formula.push(Clause::new(vec![literals[n - 1].negated(), neg(s[n - 2][k - 1])]));
}

/// At least `k` of `literals` are true, as at most `n - k` of their negations.
pub(crate) fn at_least(formula: &mut Formula, literals: &[Literal], k: usize) {
    let n = literals.len();
    if k == 0 {
        return;
    }
    if k > n {
        formula.push(Clause::new(vec![]));
        return;
    }
    let negated: Vec<Literal> = literals.iter().map(|l| l.negated()).collect();
    at_most(formula, &negated, n - k);
}

pub(crate) fn exactly(formula: &mut Formula, literals: &[Literal], k: usize) {
    at_most(formula, literals, k);
    at_least(formula, literals, k);
}
