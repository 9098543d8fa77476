//! Hashiwokakero ("Bridges") solving through propositional satisfiability.
//!
//! A [`Puzzle`] is encoded as CNF by [`encode`]: two variables per candidate edge, cardinality
//! constraints for island degrees, and clauses forbidding crossings. Connectivity cannot be stated
//! locally, so a [`Refiner`] asks a [`SearchCore`] for models and blocks the disconnected ones
//! until a connected layout turns up or the formula runs dry.

pub mod formula;

mod best_first;
mod brute_force;
mod cardinality;
mod connectivity;
mod edges;
mod encoder;
mod engine;
mod grid;
mod propagate;
mod refine;
mod render;
mod solution;
mod solver;

use log::info;
use std::str::FromStr;
use thiserror::Error;

pub use best_first::{BestFirst, BestFirstStats};
pub use brute_force::{BruteForce, DEFAULT_MAX_VARIABLES};
pub use connectivity::is_connected;
pub use edges::{candidate_edges, CandidateEdge, Orientation};
pub use encoder::{encode, Cardinality, EdgeVars, EncoderOptions, Encoding, Level};
pub use engine::{SearchCore, Varisat};
pub use formula::{Assignment, Clause, Formula, Literal, Value, Variable};
pub use grid::{GridError, Island, Position, Puzzle, MAX_DEGREE};
pub use refine::{Blocking, Outcome, Refiner};
pub use render::{load_or_report, render, render_outcome, write_report, INVALID_INPUT, NO_SOLUTION};
pub use solution::{Bridge, Solution, Violation};
pub use solver::{Solver, SolverStats};

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum SatResult {
    Satisfiable(Assignment),
    Unsatisfiable,
}

impl SatResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SatResult::Satisfiable(_))
    }

    pub fn model(&self) -> Option<&Assignment> {
        match self {
            SatResult::Satisfiable(model) => Some(model),
            SatResult::Unsatisfiable => None,
        }
    }
}

/// Failures of the search machinery itself. An unsatisfiable formula is a [`SatResult`], not an
/// error.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("formula has {variables} variables, enumeration is limited to {limit}")]
    TooManyVariables { variables: usize, limit: usize },
    #[error("no connected model within {0} iterations")]
    IterationLimit(usize),
    #[error("sat backend failed: {0}")]
    Backend(String),
    #[error("formula went back from {seen} to {now} clauses")]
    FormulaRewound { seen: usize, now: usize },
}

/// Which search core drives the refinement loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CoreKind {
    Resolution,
    BestFirst,
    Enumeration,
    Varisat,
}

impl Default for CoreKind {
    fn default() -> Self {
        CoreKind::Resolution
    }
}

impl FromStr for CoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolution" | "dpll" => Ok(CoreKind::Resolution),
            "best-first" | "astar" => Ok(CoreKind::BestFirst),
            "enumeration" | "brute-force" => Ok(CoreKind::Enumeration),
            "varisat" => Ok(CoreKind::Varisat),
            _ => Err(format!("unknown solver '{}'", s)),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SolveOptions {
    pub core: CoreKind,
    pub blocking: Blocking,
    pub encoder: EncoderOptions,
    pub max_iterations: Option<usize>,
    pub max_enumeration_variables: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            core: CoreKind::default(),
            blocking: Blocking::default(),
            encoder: EncoderOptions::default(),
            max_iterations: None,
            max_enumeration_variables: DEFAULT_MAX_VARIABLES,
        }
    }
}

/// Encode `puzzle` and run the refinement loop with the core `options` names.
pub fn solve(puzzle: &Puzzle, options: &SolveOptions) -> Result<Outcome, SolveError> {
    let encoding = encode(puzzle, &options.encoder);
    info!(
        "{} islands, {} candidate edges, {} variables, {} clauses",
        encoding.islands().len(),
        encoding.edges().len(),
        encoding.formula().num_variables(),
        encoding.formula().num_clauses()
    );

    let core: Box<dyn SearchCore + '_> = match options.core {
        CoreKind::Resolution => Box::new(Solver::new()),
        CoreKind::BestFirst => Box::new(BestFirst::new()),
        CoreKind::Varisat => Box::new(Varisat::new()),
        // the connectivity check runs inside the enumeration, so its first model is final
        CoreKind::Enumeration => Box::new(
            BruteForce::new()
                .max_variables(options.max_enumeration_variables)
                .accepting(|model: &Assignment| encoding.connects(model)),
        ),
    };
    let mut refiner = Refiner::new(&encoding, core)
        .blocking(options.blocking)
        .max_iterations(options.max_iterations);
    refiner.run()
}
