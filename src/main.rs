//! # Tangle
//!
//! Tangle is a word finding game played on a square grid of lettered dice. A
//! word is spelled by moving from die to die, horizontally, vertically, or
//! diagonally, never using the same die twice. Longer words earn more points.
//!
//! This program drives the board solver and generator from the command line.
//! Via command line options, the user can specify the dice and dictionary to
//! use. Then the user can build the word cache, solve a given board, or
//! generate a new board with a chosen density of words.

use std::{
	path::PathBuf,
	process,
	sync::mpsc,
	time::{Duration, Instant}
};

use clap::{Parser, Subcommand};
use log::{debug, trace};

use tangle::{
	dice::{self, Symbol},
	dictionary,
	generator::{Density, Event, Generation, Generator, Outcome, Request, Sources, Timer},
	solver
};

////////////////////////////////////////////////////////////////////////////////
//                           Command line options.                            //
////////////////////////////////////////////////////////////////////////////////

/// CLI for solving and generating Tangle boards.
#[derive(Clone, Debug, Parser)]
#[command(version = "1.0", author = "Todd L Smith")]
struct Opts
{
	/// The path to the dice file: 41 lines of 6 comma-separated faces.
	#[arg(short = 'D', long, default_value = "data/dice.txt")]
	dice: PathBuf,

	/// The path to the dictionary file: one word per line, optionally followed
	/// by its display spellings.
	#[arg(short = 'w', long, default_value = "data/words.txt")]
	words: PathBuf,

	/// The directory in which to cache the binary dictionary.
	#[arg(short = 'c', long, default_value = "cache")]
	cache_dir: PathBuf,

	#[command(subcommand)]
	command: Command
}

/// The subcommands of the CLI.
#[derive(Clone, Debug, Subcommand)]
enum Command
{
	/// Just build the binary dictionary and exit.
	Cache,

	/// Solve the given board, and print every word on it.
	Solve {
		/// The length of a side of the board.
		#[arg(short = 's', long, default_value = "4", value_parser = parse_size)]
		size: usize,

		/// The shortest word worth finding.
		#[arg(short = 'm', long, default_value = "3")]
		minimum: usize,

		/// The timer mode, which determines the maximum score.
		#[arg(short = 't', long, value_enum, default_value_t = Timer::Tanglet)]
		timer: Timer,

		/// The letters of the board, in row-major order, separated by commas
		/// or spaces. Without separators, each character is one cell.
		#[arg(short = 'l', long)]
		letters: String
	},

	/// Generate a new board, and print it with every word on it.
	Generate {
		/// How many words the board should contain.
		#[arg(short = 'd', long, value_enum, default_value_t = Density::Normal)]
		density: Density,

		/// The length of a side of the board.
		#[arg(short = 's', long, default_value = "4", value_parser = parse_size)]
		size: usize,

		/// The shortest word worth finding.
		#[arg(short = 'm', long, default_value = "3")]
		minimum: usize,

		/// The timer mode, which determines the maximum score.
		#[arg(short = 't', long, value_enum, default_value_t = Timer::Tanglet)]
		timer: Timer,

		/// The seed of the random number generator. Random if omitted.
		#[arg(long)]
		seed: Option<u64>,

		/// Give up after this many seconds.
		#[arg(long, default_value = "30")]
		timeout: u64,

		/// Suppress emission of the words to standard output.
		#[arg(short = 'q', long)]
		quiet: bool
	}
}

////////////////////////////////////////////////////////////////////////////////
//                               Main program.                                //
////////////////////////////////////////////////////////////////////////////////

/// Parse the command line options and execute the appropriate subcommand.
fn main()
{
	env_logger::init();

	// Parse the command line options.
	let opts = Opts::parse();
	debug!("Command line options: {:?}", opts);

	let sources = Sources {
		dice: opts.dice,
		words: opts.words,
		cache_dir: opts.cache_dir
	};

	// Execute the appropriate subcommand.
	match opts.command
	{
		Command::Cache =>
		{
			let (trie, cached) =
				dictionary::open(&sources.words, &sources.cache_dir, |_| ())
					.unwrap_or_else(|e| fail(&e.to_string()));
			trace!(
				"Exiting after {} word cache: {} words",
				if cached { "reading" } else { "building" },
				trie.len()
			);
		},
		Command::Solve { size, minimum, timer, letters } =>
		{
			let request = Request {
				density: Density::Normal,
				size,
				minimum,
				timer,
				letters: Some(
					dice::parse_symbols(&letters).unwrap_or_else(|_| fail(&format!(
						"Each cell of the board holds at most {} letters.",
						dice::SYMBOL_CAPACITY
					)))
				),
				seed: 0
			};
			let mut generator = Generator::new(sources);
			generator.create(request);
			report(generator.wait(), size, false);
		},
		Command::Generate {
			density, size, minimum, timer, seed, timeout, quiet
		} =>
		{
			let seed = seed.unwrap_or_else(rand::random);
			debug!("Seed: {}", seed);
			let request = Request {
				density,
				size,
				minimum,
				timer,
				letters: None,
				seed
			};
			let mut generator = Generator::new(sources);
			let (sender, receiver) = mpsc::channel();
			generator.set_events(sender);
			generator.create(request);

			// Watch the progress until the generation ends or time runs out.
			let deadline = Instant::now() + Duration::from_secs(timeout);
			loop
			{
				let remaining = deadline.saturating_duration_since(Instant::now());
				match receiver.recv_timeout(remaining)
				{
					Ok(Event::OptimizingStarted) =>
						eprintln!("Optimizing word list…"),
					Ok(Event::Finished) => break,
					Ok(event) => trace!("Event: {:?}", event),
					Err(_) =>
					{
						generator.cancel();
						break
					}
				}
			}
			report(generator.wait(), size, quiet);
		}
	}
}

/// Parse the length of a side of the board, accepting only the sizes for
/// which there are dice.
fn parse_size(size: &str) -> Result<usize, String>
{
	let size = size.parse::<usize>().map_err(|e| e.to_string())?;
	if dice::is_supported_size(size)
	{
		Ok(size)
	}
	else
	{
		Err(format!("no dice for a board of size {}; use 4 or 5", size))
	}
}

/// Print the outcome of a generation. Exits unsuccessfully if there is no
/// board.
///
/// # Arguments
///
/// * `outcome` - The outcome, if any.
/// * `size` - The length of a side of the board.
/// * `quiet` - Whether to suppress the word list.
fn report(outcome: Option<Outcome>, size: usize, quiet: bool)
{
	match outcome
	{
		Some(Outcome::Finished(generation)) =>
			print_generation(&generation, size, quiet),
		Some(Outcome::Failed { error, letters }) =>
		{
			print_board(&letters, size);
			fail(&error.to_string())
		},
		Some(Outcome::Canceled) | None => fail("Generation timed out.")
	}
}

/// Print a board, its maximum score, and optionally its words.
fn print_generation(generation: &Generation, size: usize, quiet: bool)
{
	print_board(&generation.letters, size);
	println!();
	println!("Density: {:?}", generation.density);
	println!("Words: {}", generation.solutions.len());
	println!("Maximum score: {}", generation.max_score);
	if !quiet
	{
		println!();
		for (word, paths) in &generation.solutions
		{
			println!("{:>2} {} ({} paths)", solver::score(word), word, paths.len());
		}
	}
}

/// Print the letters of a board as a grid.
fn print_board(letters: &[Symbol], size: usize)
{
	for row in letters.chunks(size.max(1))
	{
		let row = row.iter()
			.map(|s| format!("{:<2}", s.as_str()))
			.collect::<Vec<_>>();
		println!("{}", row.join(" "));
	}
}

/// Report an error to standard error and exit unsuccessfully.
fn fail(message: &str) -> !
{
	eprintln!("{}", message);
	process::exit(1)
}
