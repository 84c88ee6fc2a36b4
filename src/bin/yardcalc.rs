use log::{debug, error};
use std::io::{self, BufRead};
use std::process::ExitCode;
use yardcalc::{evaluate, format_postfix, to_rpn};

const USAGE: &str = "usage: yardcalc [--self-test] [--rpn] [EXPRESSION...]";

/// Reference expressions and their expected values.
const REFERENCE_CASES: &[(&str, f64)] = &[
    ("2 + 5 * 10", 52.0),
    ("-2 + 5", 3.0),
    ("-2--5", 3.0),
    ("10 - 1 + 5 * 3 / 2 * 10 + 20 * 10", 284.0),
    ("10-1+5*3/2*10*10", 759.0),
    ("2 * 5 * (2 + 10)", 120.0),
    ("2.6 * 5", 13.0),
    ("10 mod 3 mod 2", 1.0),
    ("2 ^ 2 ^ 3", 256.0),
    ("pi", std::f64::consts::PI),
    ("2 * (5+1) / 3 * (pi ^ 2)", 39.478417604357432),
    ("2 * e", 5.4365636569180902),
    ("2 ^ 3 + 2 ^ 3 ^ 4", 2417851639229258349412352.0),
    ("sqrt(9)", 3.0),
    ("2 * sqrt(9)", 6.0),
    ("sqrt(9) + 5 * 2", 13.0),
    ("(sqrt(9) + 5) * 2", 16.0),
    ("floor(pi)", 3.0),
    ("-1 - 1", -2.0),
    ("5 ** 5", 3125.0),
    ("-2 ^ 2", 4.0),
    ("2 ^ -(1 + 1)", 0.25),
    ("1 << 4 >> 2", 4.0),
];

struct Options {
    self_test: bool,
    show_rpn: bool,
    expressions: Vec<String>,
}

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut options = Options {
            self_test: false,
            show_rpn: false,
            expressions: Vec::new(),
        };
        for arg in args {
            match arg.as_str() {
                "--self-test" => options.self_test = true,
                "--rpn" => options.show_rpn = true,
                "-h" | "--help" => return Err(USAGE.to_string()),
                _ => options.expressions.push(arg),
            }
        }
        Ok(options)
    }
}

fn approx_eq(result: f64, expected: f64) -> bool {
    (result - expected).abs() <= 1e-9 * expected.abs().max(1.0)
}

/// Runs the reference table, printing one line per case. Returns the failure count.
fn self_test() -> usize {
    let mut failures = 0;
    for (expression, expected) in REFERENCE_CASES {
        match evaluate(expression) {
            Ok(result) if approx_eq(result, *expected) => {
                println!("OK: \"{}\" = {}", expression, result)
            }
            Ok(result) => {
                failures += 1;
                println!(
                    "ERR: \"{}\". Got \"{}\", Need \"{}\"",
                    expression, result, expected
                );
            }
            Err(err) => {
                failures += 1;
                println!("ERR: \"{}\". {}", expression, err);
            }
        }
    }
    failures
}

/// Prints the value of one expression; returns whether it evaluated.
fn run(expression: &str, show_rpn: bool) -> bool {
    if show_rpn {
        match to_rpn(expression) {
            Ok(postfix) => println!("rpn: {}", format_postfix(&postfix)),
            Err(err) => {
                error!("{}: {}", expression, err);
                return false;
            }
        }
    }
    match evaluate(expression) {
        Ok(result) => {
            println!("{}", result);
            true
        }
        Err(err) => {
            error!("{}: {}", expression, err);
            false
        }
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(usage) => {
            eprintln!("{}", usage);
            return ExitCode::from(2);
        }
    };

    if options.self_test {
        let failures = self_test();
        debug!("{} of {} cases failed", failures, REFERENCE_CASES.len());
        return if failures == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let mut ok = true;
    if options.expressions.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    error!("failed to read stdin: {}", err);
                    return ExitCode::FAILURE;
                }
            };
            if !line.trim().is_empty() {
                ok &= run(&line, options.show_rpn);
            }
        }
    } else {
        for expression in &options.expressions {
            ok &= run(expression, options.show_rpn);
        }
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
