//! Scenario test runner CLI
//!
//! Usage:
//!   cargo run --bin test-scenarios                    # Run all tests
//!   cargo run --bin test-scenarios -- enemies/        # Run category
//!   cargo run --bin test-scenarios -- movement/coyote # Run single test
//!   cargo run --bin test-scenarios -- --verbose       # Show details on failure
//!   cargo run --bin test-scenarios -- --parallel      # One headless app per core
//!   cargo run --bin test-scenarios -- --parallel --threads 4

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use brickrun::testing::{SCENARIOS_DIR, TestResult, parser::parse_test_file, runner::run_test};

/// Command line switches
#[derive(Debug, Default)]
struct Options {
    verbose: bool,
    parallel: bool,
    threads: Option<usize>,
    filter: Option<String>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--verbose" | "-v" => options.verbose = true,
                "--parallel" | "-p" => options.parallel = true,
                "--threads" => options.threads = args.next().and_then(|n| n.parse().ok()),
                flag if flag.starts_with('-') => eprintln!("Ignoring unknown flag {}", flag),
                other => options.filter = Some(other.to_string()),
            }
        }
        options
    }
}

/// Pass/fail/error counts
#[derive(Debug, Default)]
struct Tally {
    passed: usize,
    failed: usize,
    errors: usize,
}

impl Tally {
    fn add(&mut self, result: &TestResult) {
        match result {
            TestResult::Pass { .. } => self.passed += 1,
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Error { .. } => self.errors += 1,
        }
    }

    fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

fn main() {
    let options = Options::parse(env::args().skip(1));

    println!("Scenario Tests");
    println!("==============\n");

    let root = Path::new(SCENARIOS_DIR);
    if !root.is_dir() {
        eprintln!("No scenarios at {}; add .toml files under it", SCENARIOS_DIR);
        std::process::exit(1);
    }

    let tests = discover_tests(root, options.filter.as_deref());
    if tests.is_empty() {
        match &options.filter {
            Some(f) => eprintln!("No scenario matches '{}'", f),
            None => eprintln!("No scenario files in {}", SCENARIOS_DIR),
        }
        std::process::exit(1);
    }

    let start = Instant::now();
    let results: Vec<TestResult> = if options.parallel {
        if let Some(n) = options.threads
            && let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global()
        {
            eprintln!("Could not size thread pool: {}", e);
        }
        tests.par_iter().map(|path| run_file(path)).collect()
    } else {
        tests.iter().map(|path| run_file(path)).collect()
    };

    let mut tally = Tally::default();
    let mut last_category: Option<String> = None;
    for (path, result) in tests.iter().zip(&results) {
        let rel = path.strip_prefix(root).unwrap_or(path);
        let category = rel.parent().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
        if !category.is_empty() && last_category.as_deref() != Some(category.as_str()) {
            if last_category.is_some() {
                println!();
            }
            println!("{}/", category);
            last_category = Some(category);
        }

        let name = rel.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        tally.add(result);
        print_result(&name, result, options.verbose);
    }

    println!("\n==============");
    println!(
        "Results: {} passed, {} failed, {} errors ({:.1}s)",
        tally.passed,
        tally.failed,
        tally.errors,
        start.elapsed().as_secs_f32()
    );

    if !tally.all_passed() {
        std::process::exit(1);
    }
}

/// Parse and run one scenario file
fn run_file(path: &Path) -> TestResult {
    match parse_test_file(path) {
        Ok(def) => run_test(&def),
        Err(message) => TestResult::Error { message },
    }
}

/// Every .toml under `base` whose relative path contains `filter`, sorted
fn discover_tests(base: &Path, filter: Option<&str>) -> Vec<PathBuf> {
    let mut found = Vec::new();
    collect_toml(base, &mut found);
    found.retain(|path| {
        let rel = path.strip_prefix(base).unwrap_or(path).to_string_lossy();
        filter.is_none_or(|f| rel.contains(f))
    });
    found.sort();
    found
}

fn collect_toml(dir: &Path, found: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            collect_toml(&path, found);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            found.push(path);
        }
    }
}

fn print_result(name: &str, result: &TestResult, verbose: bool) {
    let dots = ".".repeat(40 - name.len().min(39));

    match result {
        TestResult::Pass { frames } => {
            println!("  {} {} PASS ({} frames)", name, dots, frames);
        }
        TestResult::Fail { error } => {
            println!("  {} {} FAIL", name, dots);
            if verbose {
                println!("    {}", error);
            } else {
                println!("    {}", error.message);
            }
        }
        TestResult::Error { message } => {
            println!("  {} {} ERROR", name, dots);
            println!("    {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_options_parse() {
        let options = Options::parse(args(&["-p", "--threads", "4", "enemies/", "-v"]));
        assert!(options.parallel);
        assert!(options.verbose);
        assert_eq!(options.threads, Some(4));
        assert_eq!(options.filter.as_deref(), Some("enemies/"));
    }

    #[test]
    fn test_bad_thread_count_is_ignored() {
        let options = Options::parse(args(&["--threads", "many"]));
        assert_eq!(options.threads, None);
        assert!(options.filter.is_none());
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::default();
        tally.add(&TestResult::Pass { frames: 10 });
        assert!(tally.all_passed());
        tally.add(&TestResult::Error { message: "bad".to_string() });
        assert!(!tally.all_passed());
        assert_eq!((tally.passed, tally.errors), (1, 1));
    }
}
