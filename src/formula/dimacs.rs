use crate::formula::{Clause, Formula, Literal, Variable};
use std::io::{self, BufRead, BufReader, Read, Write};
use thiserror::Error;

/// Parse a DIMACS CNF formula. Variables are 1-based in the file and 0-based in the result.
pub fn parse<R: Read>(reader: R) -> Result<Formula, DimacsParseError> {
    let reader = BufReader::new(reader);

    let mut clauses = vec![];
    let mut header = None;

    for line in reader.lines() {
        let line = line?;
        let mut line = line.split_whitespace().peekable();

        match line.peek() {
            Some(&"c") | None => continue,
            Some(&"p") => {
                let _ = line.next();

                if line.next() != Some("cnf") {
                    return Err(DimacsParseError::Format("missing 'cnf'".into()));
                }

                let num_variables = line
                    .next()
                    .and_then(|c| c.parse::<usize>().ok())
                    .ok_or_else(|| DimacsParseError::Format("invalid num_variables".into()))?;

                let num_clauses = line
                    .next()
                    .and_then(|c| c.parse::<usize>().ok())
                    .ok_or_else(|| DimacsParseError::Format("invalid num_clauses".into()))?;

                header = Some((num_variables, num_clauses));
            }
            Some(_) => {
                let num_clauses = match header {
                    Some((_, num_clauses)) => num_clauses,
                    None => return Err(DimacsParseError::Format("missing 'p' line before clauses".into())),
                };

                let mut clause = vec![];
                let mut terminated = false;
                for x in line {
                    match parse_literal(x)? {
                        Some(l) => clause.push(l),
                        None => {
                            terminated = true;
                            break;
                        }
                    }
                }
                // a bare "0" is the empty clause
                if !clause.is_empty() || terminated {
                    clauses.push(Clause::new(clause));
                }

                if clauses.len() >= num_clauses {
                    break;
                }
            }
        }
    }

    let (num_variables, _) = header.ok_or_else(|| DimacsParseError::Format("missing 'p' line before clauses".into()))?;

    let mut formula = Formula::new(clauses);
    while formula.num_variables() < num_variables {
        formula.fresh_variable();
    }
    Ok(formula)
}

fn parse_literal(s: &str) -> Result<Option<Literal>, DimacsParseError> {
    let l = s
        .parse::<isize>()
        .map_err(|_| DimacsParseError::Format(format!("invalid literal '{}'", s)))?;
    if l > 0 {
        Ok(Some(Literal::Positive(Variable(l as usize - 1))))
    } else if l < 0 {
        Ok(Some(Literal::Negative(Variable(l.unsigned_abs() - 1))))
    } else {
        Ok(None)
    }
}

/// Write `formula` in DIMACS CNF form.
pub fn write<W: Write>(formula: &Formula, mut writer: W) -> io::Result<()> {
    writeln!(writer, "p cnf {} {}", formula.num_variables(), formula.num_clauses())?;
    for clause in formula.clauses() {
        for literal in clause.literals() {
            match literal {
                Literal::Positive(Variable(x)) => write!(writer, "{} ", x + 1)?,
                Literal::Negative(Variable(x)) => write!(writer, "-{} ", x + 1)?,
            }
        }
        writeln!(writer, "0")?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum DimacsParseError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed DIMACS: {0}")]
    Format(String),
}
