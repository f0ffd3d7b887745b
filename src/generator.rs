//! # Generator
//!
//! Herein is the board generator. A board is generated by a randomized local
//! search over arrangements of the dice: starting from a random roll, the
//! generator repeatedly perturbs the best board found so far, keeping any
//! change that brings the number of findable words closer to the target of
//! the requested [density](Density). The [`Solver`] is the oracle that counts
//! the words.
//!
//! Generation runs on a background thread, and may be canceled at any time.

use std::{
	path::PathBuf,
	sync::{
		atomic::{AtomicBool, Ordering},
		mpsc::Sender,
		Arc, Mutex, PoisonError
	},
	thread::{self, JoinHandle}
};

use clap::ValueEnum;
use log::{debug, trace, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use thiserror::Error;

use crate::{
	dice::{self, Dice, DiceError, Die, Symbol, PLACEHOLDER},
	dictionary::{self, DictionaryError},
	solver::{Solutions, Solver},
	trie::Trie
};

/// The number of words that count towards the score in
/// [allotment](Timer::Allotment) games.
pub const ALLOTMENT_WORDS: usize = 30;

////////////////////////////////////////////////////////////////////////////////
//                                  Density.                                  //
////////////////////////////////////////////////////////////////////////////////

/// How many words a generated board should contain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Density
{
	/// Few words.
	Sparse,

	/// A typical number of words.
	#[default]
	Normal,

	/// Many words.
	Dense,

	/// One of the other densities, chosen at random.
	Random
}

impl Density
{
	/// Resolve a [random](Self::Random) density into a concrete one. Other
	/// densities are unchanged.
	pub fn resolve<R: Rng>(self, rng: &mut R) -> Self
	{
		match self
		{
			Self::Random =>
				[Self::Sparse, Self::Normal, Self::Dense][rng.gen_range(0..3)],
			density => density
		}
	}

	/// Compute the band of acceptable word counts for a board. A
	/// [random](Self::Random) density has no band of its own, and reports the
	/// [normal](Self::Normal) band; [resolve](Self::resolve) it first.
	///
	/// # Arguments
	///
	/// * `size` - The length of a side of the board.
	/// * `minimum` - The shortest word worth finding.
	///
	/// # Returns
	///
	/// The band.
	#[must_use]
	pub fn band(self, size: usize, minimum: usize) -> Band
	{
		let minimum = i64::try_from(minimum).unwrap_or(i64::MAX);
		let offset = (if size == 4 { 6 } else { 7 }) - minimum;
		let (target, range) = match self
		{
			Self::Sparse => (37, 5),
			Self::Normal | Self::Random =>
				(offset.saturating_mul(25).saturating_add(150), 25),
			Self::Dense => (offset.saturating_mul(75).saturating_add(250), 50)
		};
		Band { target: usize::try_from(target).unwrap_or(0), range }
	}
}

impl From<Density> for u8
{
	fn from(density: Density) -> u8
	{
		density as u8
	}
}

impl TryFrom<u8> for Density
{
	type Error = u8;

	fn try_from(value: u8) -> Result<Self, u8>
	{
		match value
		{
			0 => Ok(Self::Sparse),
			1 => Ok(Self::Normal),
			2 => Ok(Self::Dense),
			3 => Ok(Self::Random),
			_ => Err(value)
		}
	}
}

/// The acceptable word counts of a board: `target ± range`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band
{
	/// The ideal number of words.
	pub target: usize,

	/// How far the number of words may stray from the target.
	pub range: usize
}

impl Band
{
	/// Check if a board whose word count is `delta` away from the target is
	/// acceptable.
	#[inline]
	#[must_use]
	pub fn accepts(&self, delta: usize) -> bool { delta <= self.range }
}

////////////////////////////////////////////////////////////////////////////////
//                                  Timers.                                   //
////////////////////////////////////////////////////////////////////////////////

/// The timer mode of the game that the board is for. Only
/// [allotment](Self::Allotment) affects generation, by capping the score to
/// the best [`ALLOTMENT_WORDS`] words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Timer
{
	/// Finding words adds time.
	#[default]
	Tanglet,

	/// A fixed three minutes.
	Classic,

	/// Time refills after each word.
	Refill,

	/// A fixed number of words may be entered.
	Allotment,

	/// Wrong guesses cost time.
	Strikeout,

	/// No time limit.
	Discovery,

	/// Time counts up.
	Elapsed
}

impl Timer
{
	/// Get the number of words that count towards the maximum score.
	#[inline]
	#[must_use]
	pub fn max_words(self) -> Option<usize>
	{
		(self == Self::Allotment).then_some(ALLOTMENT_WORDS)
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                Board state.                                //
////////////////////////////////////////////////////////////////////////////////

/// A candidate board during the search: an arrangement of the dice, the
/// letters that they show, and how far the board is from the target.
#[derive(Clone, Debug)]
struct BoardState
{
	/// The dice, in cell order.
	dice: Vec<Die>,

	/// The top face of each die, in cell order.
	letters: Vec<Symbol>,

	/// The ideal number of words.
	target: usize,

	/// The distance of the word count from the target.
	delta: usize
}

impl BoardState
{
	/// Construct an unsolved board state. The letters are those of the dice as
	/// given.
	fn new(dice: Vec<Die>, target: usize) -> Self
	{
		let letters = dice.iter().map(Die::top).collect();
		Self { dice, letters, target, delta: usize::MAX }
	}

	/// Shuffle the dice, and roll each one.
	fn roll<R: Rng>(&mut self, solver: &mut Solver, rng: &mut R)
	{
		self.dice.shuffle(rng);
		for (die, letter) in self.dice.iter_mut().zip(self.letters.iter_mut())
		{
			die.roll(rng);
			*letter = die.top();
		}
		self.solve(solver);
	}

	/// Make a small change: either roll a single die, or swap two dice.
	fn permute<R: Rng>(&mut self, solver: &mut Solver, rng: &mut R)
	{
		if rng.gen_bool(0.5)
		{
			let index = rng.gen_range(0..self.dice.len());
			self.dice[index].roll(rng);
			self.letters[index] = self.dice[index].top();
		}
		else
		{
			let first = rng.gen_range(0..self.dice.len());
			let second = rng.gen_range(0..self.dice.len());
			self.dice.swap(first, second);
			self.letters.swap(first, second);
		}
		self.solve(solver);
	}

	/// Count the words of the board, and update the delta.
	fn solve(&mut self, solver: &mut Solver)
	{
		solver.solve(&self.letters);
		self.delta = solver.count().abs_diff(self.target);
	}
}

/// Search for a board in the band. The search is a hill climb: a permutation
/// of the current board replaces it only if it is closer to the target. After
/// `2 × size²` consecutive failures, the permutation replaces the current board
/// anyway, to escape a local minimum; after `size` such escapes, the dice are
/// rolled afresh.
///
/// # Arguments
///
/// * `current` - The starting board, which must already be solved. Replaced
///   by the final board.
/// * `solver` - The solver, bound to the right board size.
/// * `rng` - The source of randomness.
/// * `band` - The acceptable word counts.
/// * `canceled` - Checked once per iteration.
/// * `events` - Where to report restarts.
///
/// # Returns
///
/// `true` if a board in the band was found, `false` if the search was
/// canceled.
fn optimize<R: Rng>(
	current: &mut BoardState,
	solver: &mut Solver,
	rng: &mut R,
	band: Band,
	canceled: &AtomicBool,
	events: Option<&Sender<Event>>
) -> bool
{
	let size = solver.size();
	let max_tries = 2 * size * size;
	let mut tries = 0;
	let mut loops = 0;
	let mut iterations = 0u64;
	loop
	{
		if canceled.load(Ordering::Relaxed)
		{
			debug!("search canceled after {} iterations", iterations);
			return false
		}
		if band.accepts(current.delta)
		{
			debug!(
				"search finished after {} iterations: delta {}",
				iterations,
				current.delta
			);
			return true
		}
		iterations += 1;

		let mut next = current.clone();
		next.permute(solver, rng);
		if next.delta < current.delta
		{
			trace!("accepted permutation: delta {}", next.delta);
			*current = next;
			tries = 0;
			loops = 0;
			continue
		}

		tries += 1;
		if tries == max_tries
		{
			// Escape the local minimum.
			*current = next;
			tries = 0;
			loops += 1;
			if loops == size
			{
				debug!("restarting search: delta {}", current.delta);
				current.roll(solver, rng);
				loops = 0;
				if let Some(events) = events
				{
					let _ = events.send(Event::Restarted);
				}
			}
		}
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                Generation.                                 //
////////////////////////////////////////////////////////////////////////////////

/// Where the generator finds its dice and words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sources
{
	/// The dice source.
	pub dice: PathBuf,

	/// The dictionary source.
	pub words: PathBuf,

	/// The directory of word caches.
	pub cache_dir: PathBuf
}

/// A request for a board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request
{
	/// How many words the board should contain.
	pub density: Density,

	/// The length of a side of the board.
	pub size: usize,

	/// The shortest word worth finding.
	pub minimum: usize,

	/// The timer mode of the game.
	pub timer: Timer,

	/// If given, the letters of a previously generated board, which will be
	/// solved as-is rather than generated.
	pub letters: Option<Vec<Symbol>>,

	/// The seed of the random number generator.
	pub seed: u64
}

/// A generated board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation
{
	/// The letters of the board, in row-major order.
	pub letters: Vec<Symbol>,

	/// The density that the board was generated for. For a replayed board,
	/// this is the requested density, unresolved.
	pub density: Density,

	/// The best possible score.
	pub max_score: u32,

	/// Every word on the board, with every path that spells it.
	pub solutions: Solutions
}

/// How a generation ended.
#[derive(Clone, Debug)]
pub enum Outcome
{
	/// The board is ready.
	Finished(Generation),

	/// The board could not be generated.
	Failed
	{
		/// What went wrong.
		error: Arc<GenerateError>,

		/// Placeholder letters for a board of the requested size, or none if
		/// no board has that size.
		letters: Vec<Symbol>
	},

	/// The generation was canceled before it finished.
	Canceled
}

impl Outcome
{
	/// Get the finished board, if any.
	#[inline]
	#[must_use]
	pub fn generation(&self) -> Option<&Generation>
	{
		match self
		{
			Self::Finished(generation) => Some(generation),
			_ => None
		}
	}

	/// Build a failure with placeholder letters for a board of `size`. An
	/// unsupported size gets no letters at all.
	fn failed(error: GenerateError, size: usize) -> Self
	{
		warn!("{}", error);
		Self::Failed {
			error: Arc::new(error),
			letters: if dice::is_supported_size(size)
			{
				vec![Symbol::from(PLACEHOLDER); size * size]
			}
			else
			{
				Vec::new()
			}
		}
	}
}

/// Progress notifications from a running generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event
{
	/// The dictionary is being rebuilt, which may take a while.
	OptimizingStarted,

	/// The dictionary rebuild is complete.
	OptimizingFinished,

	/// The search was restarted from a fresh roll.
	Restarted,

	/// The generation has ended, one way or another.
	Finished
}

/// The loaded dice and words, kept between generations.
#[derive(Debug, Default)]
struct Resources
{
	/// The dice, and the path they came from.
	dice: Option<(PathBuf, Dice)>,

	/// The words, and the path they came from.
	words: Option<(PathBuf, Arc<Trie>)>
}

impl Resources
{
	/// Make sure that the dice and words of `sources` are loaded. Sources that
	/// are already loaded are not reloaded.
	///
	/// # Errors
	///
	/// If the dice or the words cannot be loaded.
	fn update(
		&mut self,
		sources: &Sources,
		events: Option<&Sender<Event>>
	) -> Result<(Dice, Arc<Trie>), GenerateError>
	{
		let dice = match self.dice.take()
		{
			Some((path, dice)) if path == sources.dice => dice,
			_ => Dice::read_from_file(&sources.dice)?
		};
		self.dice = Some((sources.dice.clone(), dice.clone()));

		let trie = match self.words.take()
		{
			Some((path, trie)) if path == sources.words => trie,
			_ =>
			{
				let (trie, _) = dictionary::open(
					&sources.words,
					&sources.cache_dir,
					|started| {
						if let Some(events) = events
						{
							let _ = events.send(
								if started { Event::OptimizingStarted }
								else { Event::OptimizingFinished }
							);
						}
					}
				)?;
				Arc::new(trie)
			}
		};
		self.words = Some((sources.words.clone(), Arc::clone(&trie)));
		Ok((dice, trie))
	}
}

/// Generate a board, synchronously. This is the body of the background task,
/// and is exposed for callers that manage their own threads.
///
/// # Arguments
///
/// * `dice` - The dice of the language.
/// * `trie` - The words of the language.
/// * `request` - What to generate.
/// * `canceled` - Checked once per search iteration.
/// * `events` - Where to report progress.
///
/// # Returns
///
/// The outcome of the generation.
pub fn generate(
	dice: &Dice,
	trie: Arc<Trie>,
	request: &Request,
	canceled: &AtomicBool,
	events: Option<&Sender<Event>>
) -> Outcome
{
	let size = request.size;
	let Some(dice) = dice.for_size(size) else {
		return Outcome::failed(GenerateError::Size(size), size)
	};
	let mut solver = Solver::new(trie, size, request.minimum);
	let max_words = request.timer.max_words();

	// Replay a previous board.
	if let Some(letters) = &request.letters
	{
		if letters.len() != size * size
		{
			return Outcome::failed(
				GenerateError::Letters { expected: size * size, found: letters.len() },
				size
			)
		}
		solver.solve(letters);
		return Outcome::Finished(Generation {
			letters: letters.clone(),
			density: request.density,
			max_score: solver.score(max_words),
			solutions: solver.take_solutions()
		})
	}

	let mut rng = StdRng::seed_from_u64(request.seed);
	let density = request.density.resolve(&mut rng);
	let band = density.band(size, request.minimum);
	debug!(
		"generating {}×{} board: {:?}, target {} ± {}",
		size,
		size,
		density,
		band.target,
		band.range
	);

	solver.set_track_positions(false);
	let mut current = BoardState::new(dice.to_vec(), band.target);
	current.roll(&mut solver, &mut rng);
	if !optimize(&mut current, &mut solver, &mut rng, band, canceled, events)
	{
		return Outcome::Canceled
	}

	solver.set_track_positions(true);
	solver.solve(&current.letters);
	Outcome::Finished(Generation {
		letters: current.letters,
		density,
		max_score: solver.score(max_words),
		solutions: solver.take_solutions()
	})
}

////////////////////////////////////////////////////////////////////////////////
//                                 Generator.                                 //
////////////////////////////////////////////////////////////////////////////////

/// A running generation.
#[derive(Debug)]
struct Task
{
	/// Set to ask the task to stop.
	canceled: Arc<AtomicBool>,

	/// The thread running the task.
	handle: JoinHandle<Outcome>,

	/// The length of a side of the requested board.
	size: usize
}

/// The board generator. At most one generation runs at a time; starting a new
/// one cancels the old one first.
#[derive(Debug)]
#[must_use]
pub struct Generator
{
	/// Where to find the dice and words.
	sources: Sources,

	/// The dice and words loaded so far.
	resources: Arc<Mutex<Resources>>,

	/// Where to report progress, if anywhere.
	events: Option<Sender<Event>>,

	/// The running generation, if any.
	task: Option<Task>
}

impl Generator
{
	/// Construct a generator. Nothing is loaded until the first generation.
	///
	/// # Arguments
	///
	/// * `sources` - Where to find the dice and words.
	pub fn new(sources: Sources) -> Self
	{
		Self {
			sources,
			resources: Default::default(),
			events: None,
			task: None
		}
	}

	/// Report the progress of future generations to `events`.
	#[inline]
	pub fn set_events(&mut self, events: Sender<Event>)
	{
		self.events = Some(events);
	}

	/// Get the sources of dice and words.
	#[inline]
	#[must_use]
	pub fn sources(&self) -> &Sources { &self.sources }

	/// Change the sources of dice and words. The new sources are loaded by
	/// the next generation.
	#[inline]
	pub fn set_sources(&mut self, sources: Sources)
	{
		self.sources = sources;
	}

	/// Start generating a board in the background. Any running generation is
	/// canceled first.
	///
	/// # Arguments
	///
	/// * `request` - What to generate.
	pub fn create(&mut self, request: Request)
	{
		self.cancel();
		let canceled = Arc::new(AtomicBool::new(false));
		let task_canceled = Arc::clone(&canceled);
		let resources = Arc::clone(&self.resources);
		let sources = self.sources.clone();
		let events = self.events.clone();
		let size = request.size;
		let handle = thread::spawn(move || {
			let loaded = resources
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.update(&sources, events.as_ref());
			let outcome = match loaded
			{
				Ok((dice, trie)) => generate(
					&dice,
					trie,
					&request,
					&task_canceled,
					events.as_ref()
				),
				Err(e) => Outcome::failed(e, request.size)
			};
			if let Some(events) = &events
			{
				let _ = events.send(Event::Finished);
			}
			outcome
		});
		self.task = Some(Task { canceled, handle, size });
	}

	/// Check if a generation is running.
	#[inline]
	#[must_use]
	pub fn is_running(&self) -> bool
	{
		self.task.as_ref().is_some_and(|task| !task.handle.is_finished())
	}

	/// Cancel the running generation, if any, and wait for it to stop. Its
	/// outcome is discarded.
	pub fn cancel(&mut self)
	{
		if let Some(task) = self.task.take()
		{
			task.canceled.store(true, Ordering::Relaxed);
			let _ = task.handle.join();
			trace!("canceled generation");
		}
	}

	/// Wait for the running generation to end.
	///
	/// # Returns
	///
	/// The outcome, or `None` if no generation was started.
	pub fn wait(&mut self) -> Option<Outcome>
	{
		let task = self.task.take()?;
		Some(Self::join(task))
	}

	/// Take the outcome of the generation, but only if it has ended.
	///
	/// # Returns
	///
	/// The outcome, or `None` if no generation was started or it is still
	/// running.
	pub fn try_outcome(&mut self) -> Option<Outcome>
	{
		if self.is_running()
		{
			return None
		}
		self.wait()
	}

	/// Join a task. A panicked task is a failure, never a cancellation.
	fn join(task: Task) -> Outcome
	{
		let size = task.size;
		task.handle.join()
			.unwrap_or_else(|_| Outcome::failed(GenerateError::Panicked, size))
	}
}

impl Drop for Generator
{
	fn drop(&mut self)
	{
		self.cancel();
	}
}

/// The complete enumeration of generation errors. The message of each is fit
/// for the user.
#[derive(Debug, Error)]
pub enum GenerateError
{
	/// The dice could not be loaded.
	#[error(transparent)]
	Dice(#[from] DiceError),

	/// The words could not be loaded.
	#[error(transparent)]
	Dictionary(#[from] DictionaryError),

	/// There are no dice for a board of the requested size.
	#[error("No dice for a board of size {0}.")]
	Size(usize),

	/// The generation thread panicked.
	#[error("Board generation failed unexpectedly.")]
	Panicked,

	/// The letters of a replayed board do not fit the board.
	#[error("Expected {expected} letters for the board, found {found}.")]
	Letters
	{
		/// The number of cells.
		expected: usize,

		/// The number of letters given.
		found: usize
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
