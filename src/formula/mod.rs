pub mod dimacs;

use std::fmt::{self, Display, Formatter};

#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Variable(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Literal {
    Positive(Variable),
    Negative(Variable),
}

impl Literal {
    pub fn new(variable: Variable, positive: bool) -> Self {
        if positive {
            Literal::Positive(variable)
        } else {
            Literal::Negative(variable)
        }
    }

    pub fn variable(&self) -> Variable {
        match self {
            Literal::Positive(v) => *v,
            Literal::Negative(v) => *v,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Literal::Positive(_) => true,
            Literal::Negative(_) => false,
        }
    }

    pub fn idx(&self) -> usize {
        self.variable().0
    }

    pub fn negated(&self) -> Self {
        match self {
            Literal::Positive(v) => Literal::Negative(*v),
            Literal::Negative(v) => Literal::Positive(*v),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Literal::Positive(Variable(x)) => write!(f, "{}", x),
            Literal::Negative(Variable(x)) => write!(f, "!{}", x),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(disjuncts: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: disjuncts.into_iter().collect(),
        }
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    fn max_variable(&self) -> Option<Variable> {
        self.literals.iter().map(|literal| literal.variable()).max()
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.literals.len() != 1 {
            f.write_str("(")?;
        }
        let mut first_literal = true;
        for literal in &self.literals {
            if first_literal {
                first_literal = false;
            } else {
                f.write_str(" | ")?;
            }
            write!(f, "{}", literal)?;
        }
        if self.literals.len() != 1 {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// A conjunction of clauses over densely indexed variables.
///
/// Clauses are only ever appended, so the clause count doubles as a version number: a consumer that
/// remembers [`Formula::version`] can later fetch exactly the clauses added since with
/// [`Formula::clauses_since`].
#[derive(Clone, Debug, Default)]
pub struct Formula {
    clauses: Vec<Clause>,
    num_variables: usize,
}

impl Formula {
    pub fn new(conjuncts: impl IntoIterator<Item = Clause>) -> Self {
        let mut formula = Self::default();
        for clause in conjuncts {
            formula.push(clause);
        }
        formula
    }

    /// Allocate a variable that no clause mentions yet.
    pub fn fresh_variable(&mut self) -> Variable {
        let variable = Variable(self.num_variables);
        self.num_variables += 1;
        variable
    }

    pub fn push(&mut self, clause: Clause) {
        if let Some(Variable(max)) = clause.max_variable() {
            self.num_variables = self.num_variables.max(max + 1);
        }
        self.clauses.push(clause);
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn version(&self) -> usize {
        self.clauses.len()
    }

    pub fn clause(&self, idx: usize) -> &Clause {
        &self.clauses[idx]
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Clauses appended after the formula was at `version`.
    pub fn clauses_since(&self, version: usize) -> &[Clause] {
        &self.clauses[version.min(self.clauses.len())..]
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut first_clause = true;
        for clause in &self.clauses {
            if first_clause {
                first_clause = false;
            } else {
                f.write_str(" & ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Value {
    True,
    False,
    Undecided,
}

/// How a clause stands under a partial assignment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClauseState {
    Satisfied,
    Conflict,
    Unit(Literal),
    Open,
}

/// A tri-state value per variable, sized once from the formula's variable count.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Assignment {
    values: Vec<Value>,
}

impl Assignment {
    pub fn new(num_variables: usize) -> Self {
        Self {
            values: vec![Value::Undecided; num_variables],
        }
    }

    pub fn from_bools(values: impl IntoIterator<Item = bool>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|b| if b { Value::True } else { Value::False })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variables beyond the assignment's size read as undecided.
    pub fn get(&self, variable: Variable) -> Value {
        self.values.get(variable.0).copied().unwrap_or(Value::Undecided)
    }

    pub fn set(&mut self, variable: Variable, value: Value) {
        if variable.0 >= self.values.len() {
            self.values.resize(variable.0 + 1, Value::Undecided);
        }
        self.values[variable.0] = value;
    }

    /// Make `literal` true.
    pub fn assign(&mut self, literal: Literal) {
        let value = if literal.is_positive() { Value::True } else { Value::False };
        self.set(literal.variable(), value);
    }

    /// Undecided variables count as false.
    pub fn is_true(&self, variable: Variable) -> bool {
        self.get(variable) == Value::True
    }

    pub fn literal_value(&self, literal: &Literal) -> Value {
        match (self.get(literal.variable()), literal.is_positive()) {
            (Value::Undecided, _) => Value::Undecided,
            (Value::True, true) | (Value::False, false) => Value::True,
            _ => Value::False,
        }
    }

    pub fn evaluate(&self, clause: &Clause) -> ClauseState {
        let mut unit = None;
        let mut undecided = 0;
        for literal in clause.literals() {
            match self.literal_value(literal) {
                Value::True => return ClauseState::Satisfied,
                Value::False => {}
                Value::Undecided => {
                    // the same literal may appear more than once
                    if unit != Some(*literal) {
                        undecided += 1;
                        unit = Some(*literal);
                    }
                }
            }
        }
        match (undecided, unit) {
            (0, _) => ClauseState::Conflict,
            (1, Some(literal)) => ClauseState::Unit(literal),
            _ => ClauseState::Open,
        }
    }

    pub fn num_undecided(&self) -> usize {
        self.values.iter().filter(|v| **v == Value::Undecided).count()
    }

    /// Replace every undecided variable by false, turning a partial model into a total one.
    pub fn completed(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|v| if *v == Value::True { Value::True } else { Value::False })
                .collect(),
        }
    }

    /// Whether every clause has a literal that is true under this assignment.
    pub fn satisfies(&self, formula: &Formula) -> bool {
        formula
            .clauses()
            .all(|clause| clause.literals().any(|l| self.literal_value(l) == Value::True))
    }
}

#[cfg(test)]
pub(crate) fn p(x: usize) -> Literal {
    Literal::Positive(Variable(x))
}

#[cfg(test)]
pub(crate) fn n(x: usize) -> Literal {
    Literal::Negative(Variable(x))
}

/// Random formulas over at most `max_vars` variables.
#[cfg(test)]
pub(crate) fn formula_strategy(max_vars: usize, max_clauses: usize) -> impl proptest::strategy::Strategy<Value = Formula> {
    use proptest::prelude::*;

    (1..=max_vars).prop_flat_map(move |num_vars| {
        let literal = (0..num_vars, any::<bool>()).prop_map(|(v, positive)| Literal::new(Variable(v), positive));
        let clause = proptest::collection::vec(literal, 1..=3).prop_map(Clause::new);
        proptest::collection::vec(clause, 1..=max_clauses).prop_map(Formula::new)
    })
}
