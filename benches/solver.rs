use std::collections::BTreeSet;

use mandelgen::bench::{Benchmark, BenchmarkReport};
use mandelgen::cancel::CancelToken;
use mandelgen::coord::{Dimensions, Viewport};
use mandelgen::solver::{
    make_solver, ArraySolver, ArrayState, MbState, Solver, VecSolver, VecState,
};
use mandelgen::threads::{Join, Split};

const ITERATIONS: u32 = 100;
const REPEATS: usize = 5;

fn thread_counts() -> Vec<usize> {
    let counts: BTreeSet<usize> = [1, 2, 4, num_cpus::get_physical(), num_cpus::get()]
        .into_iter()
        .collect();
    counts.into_iter().collect()
}

fn benchmark_solver<S, T>(name: &str, threads: usize, height: usize) -> Benchmark
where
    T: MbState + Split + Join + Send + 'static,
    S: Solver<T> + Default + Clone + Send + 'static,
{
    let width = (3 * height) / 2;
    let dims = Dimensions::new(width, height).expect("benchmark dimensions");
    let solver = make_solver::<S, T>(threads);
    let f = move || {
        let initial = T::initialize(dims, ITERATIONS, &Viewport::CLASSIC, CancelToken::new())
            .expect("initialize");
        solver.solve(initial).expect("solve");
    };
    Benchmark::iter(
        &format!("solver-{}-t{}-{}", name, threads, height),
        REPEATS,
        f,
    )
}

fn main() {
    let mut benches = vec![];
    for height in [500, 1000] {
        for t in thread_counts() {
            benches.push(benchmark_solver::<VecSolver, VecState>("vec", t, height));
            benches.push(benchmark_solver::<ArraySolver, ArrayState>("arr", t, height));
        }
    }
    BenchmarkReport::with_benches(&benches).report("solver");
}
