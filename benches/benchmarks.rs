use std::{fs, path::Path, sync::Arc, time::Duration};

use const_format::concatcp;
use criterion::{measurement::Measurement, BenchmarkGroup, Criterion};
use tangle::{
	dice::Symbol,
	dictionary::{self, cache_path},
	solver::Solver,
	trie::Trie
};

/// The path of the directory containing the sample data.
#[inline]
#[must_use]
const fn dir() -> &'static str
{
	"data"
}

/// The path of the directory for the benchmark word cache.
#[inline]
#[must_use]
const fn cache_dir() -> &'static str
{
	concatcp!("target/", dir(), "/cache")
}

/// The path to the dictionary source.
#[inline]
#[must_use]
const fn path_words() -> &'static str
{
	concatcp!(dir(), "/words.txt")
}

/// Benchmark building a trie from the dictionary source.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_build<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	let source = fs::read(path_words()).unwrap();
	g.bench_function("build", |b| {
		b.iter(|| dictionary::build(&source).unwrap());
	});
}

/// Benchmark reading a trie from the word cache.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_deserialize_from_file<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	let cache = cache_path(Path::new(cache_dir()), Path::new(path_words()));
	g.bench_function("deserialize_from_file", |b| {
		b.iter(|| Trie::deserialize_from_file(&cache).unwrap());
	});
}

/// Benchmark solving a board.
///
/// # Arguments
///
/// * `g` - The benchmark group.
fn bench_solver<M: Measurement>(g: &mut BenchmarkGroup<M>)
{
	let (trie, _) = dictionary::open(
		Path::new(path_words()),
		Path::new(cache_dir()),
		|_| ()
	).unwrap();
	let letters = [
		"S", "E", "R", "S",
		"P", "A", "T", "G",
		"L", "I", "N", "E",
		"S", "E", "R", "S"
	].map(Symbol::from);
	let mut solver = Solver::new(Arc::new(trie), 4, 3);
	g.bench_function("solve", |b| {
		b.iter(|| {
			solver.solve(&letters);
			assert!(solver.count() > 0);
		});
	});
	solver.set_track_positions(false);
	g.bench_function("solve_untracked", |b| {
		b.iter(|| {
			solver.solve(&letters);
			assert!(solver.count() > 0);
		});
	});
}

/// Run all benchmarks.
///
/// The main purpose of the benchmarking is to ensure that
/// [`deserialize_from_file`](Trie::deserialize_from_file) is faster than
/// [`build`](dictionary::build), and that untracked solving, as used while
/// generating, is faster than tracked solving.
fn main()
{
	// Ensure that the word cache exists.
	let _ = dictionary::open(
		Path::new(path_words()),
		Path::new(cache_dir()),
		|_| ()
	).unwrap();

	// Run the benchmarks.
	let mut criterion = Criterion::default().configure_from_args();
	let mut group = criterion.benchmark_group("benchmarks");
	group.measurement_time(Duration::from_secs(10));
	bench_build(&mut group);
	bench_deserialize_from_file(&mut group);
	bench_solver(&mut group);
	group.finish();

	// Generate the final summary.
	criterion.final_summary();
}
