use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const MAX_DEGREE: u8 = 8;

/// A cell coordinate; ordered row-major.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Island {
    pub position: Position,
    /// Number of bridges that must end here, 1..=8.
    pub degree: u8,
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("empty input")]
    Empty,
    #[error("line {line}, column {column}: '{text}' is not a cell value")]
    BadCell { line: usize, column: usize, text: String },
    #[error("line {line}, column {column}: {value} is not between 0 and 8")]
    OutOfRange { line: usize, column: usize, value: u32 },
    #[error("line {line} has {found} cells, expected {expected}")]
    Ragged { line: usize, expected: usize, found: usize },
    #[error("grid has no islands")]
    NoIslands,
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),
}

/// A rectangular Hashiwokakero grid: 0 is water, 1..=8 an island with that many bridges.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Puzzle {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
    islands: Vec<Island>,
}

impl Puzzle {
    /// Parse comma-separated rows, one per line. Blank lines are ignored.
    pub fn parse(input: &str) -> Result<Self, GridError> {
        let mut rows: Vec<Vec<u8>> = vec![];
        for (line_idx, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut row = vec![];
            for (col_idx, text) in line.split(',').enumerate() {
                let text = text.trim();
                let value = text.parse::<u32>().map_err(|_| GridError::BadCell {
                    line: line_idx + 1,
                    column: col_idx + 1,
                    text: text.to_string(),
                })?;
                if value > MAX_DEGREE as u32 {
                    return Err(GridError::OutOfRange {
                        line: line_idx + 1,
                        column: col_idx + 1,
                        value,
                    });
                }
                row.push(value as u8);
            }
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(GridError::Ragged {
                        line: line_idx + 1,
                        expected: first.len(),
                        found: row.len(),
                    });
                }
            }
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let input = fs::read_to_string(path)?;
        Self::parse(&input)
    }

    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let cols = match rows.first() {
            None => return Err(GridError::Empty),
            Some(first) => first.len(),
        };
        if cols == 0 {
            return Err(GridError::Empty);
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::Ragged {
                    line: idx + 1,
                    expected: cols,
                    found: row.len(),
                });
            }
            if let Some((col, &value)) = row.iter().enumerate().find(|(_, v)| **v > MAX_DEGREE) {
                return Err(GridError::OutOfRange {
                    line: idx + 1,
                    column: col + 1,
                    value: value as u32,
                });
            }
        }

        let num_rows = rows.len();
        let cells: Vec<u8> = rows.into_iter().flatten().collect();
        let islands: Vec<Island> = cells
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(idx, &degree)| Island {
                position: Position::new(idx / cols, idx % cols),
                degree,
            })
            .collect();
        if islands.is_empty() {
            return Err(GridError::NoIslands);
        }

        Ok(Self {
            rows: num_rows,
            cols,
            cells,
            islands,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell value at `position`; positions outside the grid read as water.
    pub fn cell(&self, position: Position) -> u8 {
        if position.row >= self.rows || position.col >= self.cols {
            return 0;
        }
        self.cells[position.row * self.cols + position.col]
    }

    pub fn is_island(&self, position: Position) -> bool {
        self.cell(position) > 0
    }

    /// Islands in row-major order.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn island_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.islands.iter().map(|island| island.position)
    }
}
