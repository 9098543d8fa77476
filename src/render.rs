use crate::edges::Orientation;
use crate::grid::{Position, Puzzle};
use crate::refine::Outcome;
use crate::solution::Solution;
use log::error;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub const NO_SOLUTION: &str = "No solution found";
pub const INVALID_INPUT: &str = "Invalid or empty input.";

fn bridge_symbol(orientation: Orientation, weight: u8) -> char {
    match (orientation, weight) {
        (Orientation::Horizontal, 1) => '-',
        (Orientation::Horizontal, _) => '=',
        (Orientation::Vertical, 1) => '|',
        (Orientation::Vertical, _) => '$',
    }
}

/// Draw `solution` onto the puzzle board, one bracketed row per line:
///
/// ```text
/// [ "2" , "=" , "3" ]
/// ```
pub fn render(puzzle: &Puzzle, solution: &Solution) -> String {
    let mut board: Vec<Vec<char>> = (0..puzzle.rows())
        .map(|row| {
            (0..puzzle.cols())
                .map(|col| {
                    let degree = puzzle.cell(Position::new(row, col));
                    char::from(b'0' + degree)
                })
                .collect()
        })
        .collect();

    for bridge in solution.bridges() {
        let symbol = bridge_symbol(bridge.edge.orientation(), bridge.weight);
        for cell in bridge.edge.interior() {
            board[cell.row][cell.col] = symbol;
        }
    }

    let mut out = String::new();
    for row in board {
        let cells: Vec<String> = row.iter().map(|c| format!("\"{}\"", c)).collect();
        out.push_str("[ ");
        out.push_str(&cells.join(" , "));
        out.push_str(" ]\n");
    }
    out
}

/// The board for a solved puzzle, the no-solution message otherwise.
pub fn render_outcome(puzzle: &Puzzle, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Solved(solution) => render(puzzle, solution),
        Outcome::NoSolution => format!("{}\n", NO_SOLUTION),
    }
}

/// Write `text` to `path`, or to stdout when no path is given.
pub fn write_report(path: Option<&Path>, text: &str) -> io::Result<()> {
    match path {
        Some(path) => File::create(path)?.write_all(text.as_bytes()),
        None => io::stdout().write_all(text.as_bytes()),
    }
}

/// Read the puzzle at `input`. When it is missing, malformed or empty, the invalid-input message
/// goes to `output` in place of a board and `None` comes back.
pub fn load_or_report(input: &Path, output: Option<&Path>) -> io::Result<Option<Puzzle>> {
    match Puzzle::from_file(input) {
        Ok(puzzle) => Ok(Some(puzzle)),
        Err(e) => {
            error!("{}: {}", input.display(), e);
            write_report(output, &format!("{}\n", INVALID_INPUT))?;
            Ok(None)
        }
    }
}
