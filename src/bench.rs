//! Minimal timing harness used by the `benches/` targets.

use std::fs;
use std::io::{self, stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct Benchmark {
    f: Rc<dyn Fn()>,
    name: String,
    iterations: usize,
}

impl Benchmark {
    pub fn iter<F: Fn() + 'static>(name: &str, n: usize, f: F) -> Self {
        Self {
            f: Rc::new(f),
            name: name.to_string(),
            iterations: n.max(1),
        }
    }

    pub fn once<F: Fn() + 'static>(name: &str, f: F) -> Self {
        Self::iter(name, 1, f)
    }

    pub fn run(&self) -> Duration {
        let start = Instant::now();
        for _ in 0..self.iterations {
            (self.f)();
        }
        start.elapsed()
    }
}

struct Measurement {
    name: String,
    iterations: usize,
    total: Duration,
}

impl Measurement {
    fn per_call(&self) -> Duration {
        self.total.div_f64(self.iterations as f64)
    }
}

#[derive(Default)]
pub struct BenchmarkReport {
    benches: Vec<Benchmark>,
    results: Vec<Measurement>,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_benches(benches: &[Benchmark]) -> Self {
        Self {
            benches: benches.to_vec(),
            results: vec![],
        }
    }

    pub fn add_bench(&mut self, bench: Benchmark) {
        self.benches.push(bench);
    }

    pub fn run(&mut self) {
        for bench in &self.benches {
            let total = bench.run();
            self.results.push(Measurement {
                name: bench.name.clone(),
                iterations: bench.iterations,
                total,
            });
            print!(".");
            let _ = stdout().flush();
        }
        println!();
    }

    pub fn show(&self) {
        println!("  {: <36} {: >12} {: >12}", "benchmark", "total", "per_call");
        for m in &self.results {
            println!(
                "  {: <36} {: >12} {: >12}",
                m.name,
                format!("{:.3?}", m.total),
                format!("{:.3?}", m.per_call()),
            );
        }
    }

    pub fn write_csv(&self, filename: &str) -> io::Result<()> {
        let mut csv = String::from("benchmark,total_us,iterations,per_call_us\n");
        for m in &self.results {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                m.name,
                m.total.as_micros(),
                m.iterations,
                m.per_call().as_micros(),
            ));
        }
        fs::write(filename, csv)
    }

    pub fn report(&mut self, name: &str) {
        print!("Benchmark: {}", name);
        self.run();
        self.show();
        let csv = format!("benchmark_{}.csv", name);
        if let Err(e) = self.write_csv(&csv) {
            eprintln!("could not write {}: {}", csv, e);
        }
    }
}
