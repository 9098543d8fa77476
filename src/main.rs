use clap::{App, Arg, ArgMatches};
use hashisat::formula::dimacs::{self, DimacsParseError};
use hashisat::formula::Formula;
use hashisat::*;
use log::info;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

const EXIT_SOLVED: i32 = 0;
const EXIT_NO_SOLUTION: i32 = 1;
const EXIT_ERROR: i32 = 2;

fn main() {
    env_logger::init();

    let matches = App::new("hashisat")
        .about("Solve Hashiwokakero puzzles with a SAT encoding")
        .arg(
            Arg::with_name("INPUT")
                .help("puzzle grid (comma-separated rows), or a CNF file with --cnf")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .takes_value(true)
                .help("write the solved board here instead of stdout"),
        )
        .arg(
            Arg::with_name("solver")
                .long("solver")
                .takes_value(true)
                .possible_values(&["resolution", "dpll", "best-first", "astar", "enumeration", "brute-force", "varisat"])
                .default_value("resolution"),
        )
        .arg(
            Arg::with_name("blocking")
                .long("blocking")
                .takes_value(true)
                .possible_values(&["tight", "loose"])
                .default_value("tight"),
        )
        .arg(
            Arg::with_name("cardinality")
                .long("cardinality")
                .takes_value(true)
                .possible_values(&["direct", "sequential", "seqcounter"])
                .default_value("direct"),
        )
        .arg(
            Arg::with_name("no-pruning")
                .long("no-pruning")
                .help("allow bridges that close off a pair of 1s or a double between two 2s"),
        )
        .arg(
            Arg::with_name("max-iterations")
                .long("max-iterations")
                .takes_value(true)
                .help("give up after this many refinement iterations"),
        )
        .arg(
            Arg::with_name("max-enum-vars")
                .long("max-enum-vars")
                .takes_value(true)
                .help("largest formula the enumeration solver will attempt"),
        )
        .arg(
            Arg::with_name("dimacs")
                .long("dimacs")
                .takes_value(true)
                .value_name("FILE")
                .help("also write the puzzle's base formula in DIMACS form"),
        )
        .arg(
            Arg::with_name("cnf")
                .long("cnf")
                .help("read INPUT as DIMACS CNF and only decide satisfiability"),
        )
        .get_matches();

    let options = match options_from(&matches) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_ERROR);
        }
    };
    // required by clap
    let input = matches.value_of("INPUT").unwrap_or_default();

    let start = Instant::now();
    let exit_code = if matches.is_present("cnf") {
        run_cnf(input, &options)
    } else {
        run_puzzle(input, matches.value_of("output"), matches.value_of("dimacs"), &options)
    };
    info!("finished in {:.3}s", start.elapsed().as_secs_f64());
    std::process::exit(exit_code);
}

fn parse_flag<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, String>
where
    T::Err: ToString,
{
    matches
        .value_of(name)
        .map(|value| value.parse::<T>().map_err(|e| format!("--{}: {}", name, e.to_string())))
        .transpose()
}

fn options_from(matches: &ArgMatches) -> Result<SolveOptions, String> {
    let mut options = SolveOptions::default();
    if let Some(core) = parse_flag(matches, "solver")? {
        options.core = core;
    }
    if let Some(blocking) = parse_flag(matches, "blocking")? {
        options.blocking = blocking;
    }
    if let Some(cardinality) = parse_flag(matches, "cardinality")? {
        options.encoder.cardinality = cardinality;
    }
    options.encoder.isolation_pruning = !matches.is_present("no-pruning");
    options.max_iterations = parse_flag(matches, "max-iterations")?;
    if let Some(limit) = parse_flag(matches, "max-enum-vars")? {
        options.max_enumeration_variables = limit;
    }
    Ok(options)
}

fn run_puzzle(input: &str, output: Option<&str>, dimacs_out: Option<&str>, options: &SolveOptions) -> i32 {
    let output = output.map(Path::new);
    let puzzle = match load_or_report(Path::new(input), output) {
        Ok(Some(puzzle)) => puzzle,
        Ok(None) => return EXIT_ERROR,
        Err(e) => {
            eprintln!("could not write output: {}", e);
            return EXIT_ERROR;
        }
    };

    if let Some(path) = dimacs_out {
        let encoding = encode(&puzzle, &options.encoder);
        let written = File::create(path).and_then(|file| dimacs::write(encoding.formula(), file));
        if let Err(e) = written {
            eprintln!("could not write {}: {}", path, e);
            return EXIT_ERROR;
        }
        info!("base formula written to {}", path);
    }

    let outcome = match solve(&puzzle, options) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("solver error: {}", e);
            return EXIT_ERROR;
        }
    };
    if let Err(e) = write_report(output, &render_outcome(&puzzle, &outcome)) {
        eprintln!("could not write output: {}", e);
        return EXIT_ERROR;
    }
    match outcome {
        Outcome::Solved(_) => EXIT_SOLVED,
        Outcome::NoSolution => EXIT_NO_SOLUTION,
    }
}

fn run_cnf(input: &str, options: &SolveOptions) -> i32 {
    let f = match parse_from_file(input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("parse error: {}", e);
            return EXIT_ERROR;
        }
    };

    let mut core: Box<dyn SearchCore> = match options.core {
        CoreKind::Resolution => Box::new(Solver::new()),
        CoreKind::BestFirst => Box::new(BestFirst::new()),
        CoreKind::Enumeration => Box::new(BruteForce::new().max_variables(options.max_enumeration_variables)),
        CoreKind::Varisat => Box::new(Varisat::new()),
    };
    match core.solve(&f) {
        Ok(SatResult::Satisfiable(_)) => {
            println!("SAT");
            EXIT_SOLVED
        }
        Ok(SatResult::Unsatisfiable) => {
            println!("UNSAT");
            EXIT_NO_SOLUTION
        }
        Err(e) => {
            eprintln!("{} failed: {}", core.name(), e);
            EXIT_ERROR
        }
    }
}

fn parse_from_file(path: &str) -> Result<Formula, DimacsParseError> {
    let file = File::open(path)?;
    dimacs::parse(file)
}
