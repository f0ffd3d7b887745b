//! # Dictionary
//!
//! Herein is support for turning a dictionary source into a [`Trie`], and for
//! caching the result. A dictionary source holds one entry per line: the first
//! token is the word, and any further tokens are its display spellings.

use std::{
	collections::BTreeMap,
	fs,
	io,
	path::{Path, PathBuf},
	str
};

use log::{trace, warn};
use thiserror::Error;
use twox_hash::XxHash64;

use crate::trie::{CacheError, Trie, MAX_WORD_LENGTH, MIN_WORD_LENGTH};

////////////////////////////////////////////////////////////////////////////////
//                                 Parsing.                                   //
////////////////////////////////////////////////////////////////////////////////

/// Parse a dictionary source into a map from canonical (uppercase) words to
/// their display spellings. Blank lines are skipped. A line with a single
/// token uses the lowercase form of the word as its only spelling. Words whose
/// length falls outside [`MIN_WORD_LENGTH`]..=[`MAX_WORD_LENGTH`] are
/// discarded. A word that appears twice keeps the spellings of its last line.
///
/// # Arguments
///
/// * `source` - The text of the dictionary.
///
/// # Returns
///
/// The words of the dictionary, in lexicographic order.
#[must_use]
pub fn parse(source: &str) -> BTreeMap<String, Vec<String>>
{
	let mut words = BTreeMap::new();
	for line in source.lines()
	{
		let mut tokens = line.split_whitespace();
		let Some(first) = tokens.next() else { continue };
		let word = first.to_uppercase();
		let length = word.chars().count();
		if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&length)
		{
			continue
		}
		let mut spellings = tokens.map(str::to_string).collect::<Vec<_>>();
		if spellings.is_empty()
		{
			spellings.push(word.to_lowercase());
		}
		words.insert(word, spellings);
	}
	words
}

/// Build a trie from the raw bytes of a dictionary source.
///
/// # Arguments
///
/// * `source` - The raw, already decompressed, dictionary bytes.
///
/// # Returns
///
/// A trie of every valid word in the source.
///
/// # Errors
///
/// * [`DictionaryError::InvalidUtf8`] if the source is not UTF-8.
/// * [`DictionaryError::Empty`] if the source yields no valid words.
pub fn build(source: &[u8]) -> Result<Trie, DictionaryError>
{
	let source = str::from_utf8(source)?;
	let trie = Trie::from_words(parse(source));
	if trie.is_empty()
	{
		return Err(DictionaryError::Empty)
	}
	Ok(trie)
}

////////////////////////////////////////////////////////////////////////////////
//                                  Caching.                                  //
////////////////////////////////////////////////////////////////////////////////

/// Compute the path of the cache file for the given dictionary source. The
/// name of the cache file is the hexadecimal xxHash of the source path, so
/// that each source gets its own cache.
///
/// # Arguments
///
/// * `cache_dir` - The directory that holds the word caches.
/// * `source` - The path of the dictionary source.
///
/// # Returns
///
/// The path of the cache file.
#[must_use]
pub fn cache_path(cache_dir: &Path, source: &Path) -> PathBuf
{
	let key = source.to_string_lossy();
	let hash = XxHash64::oneshot(0, key.as_bytes());
	cache_dir.join(format!("{:016x}", hash))
}

/// Check if the cache file is newer than the source file. If anything goes
/// wrong, including a missing cache, the cache is considered stale.
fn is_cache_fresh(cache: &Path, source: &Path) -> bool
{
	cache
		.metadata()
		.and_then(|m| m.modified())
		.and_then(|cache_time| {
			source
				.metadata()
				.and_then(|m| m.modified())
				.map(|source_time| cache_time > source_time)
		})
		.unwrap_or(false)
}

/// Open the dictionary at `source`. If a cached trie exists in `cache_dir`,
/// _and_ is newer than the source, _and_ has a matching header, it will be
/// read; otherwise, the source will be parsed and the cache (re)written to
/// optimize future reads. Failure to write the cache is not an error.
///
/// # Arguments
///
/// * `source` - The path of the dictionary source.
/// * `cache_dir` - The directory that holds the word caches.
/// * `on_rebuild` - Called with `true` before the source is parsed, and with
///   `false` once parsing is complete. Not called on a cache hit.
///
/// # Returns
///
/// The trie of the dictionary, and whether it was read from the cache.
///
/// # Errors
///
/// * [`DictionaryError::Io`] if the source cannot be read.
/// * [`DictionaryError::InvalidUtf8`] if the source is not UTF-8.
/// * [`DictionaryError::Empty`] if the source yields no valid words.
pub fn open<F>(
	source: &Path,
	cache_dir: &Path,
	mut on_rebuild: F
) -> Result<(Trie, bool), DictionaryError>
	where F: FnMut(bool)
{
	let cache = cache_path(cache_dir, source);
	if is_cache_fresh(&cache, source)
	{
		match Trie::deserialize_from_file(&cache)
		{
			Ok(trie) if !trie.is_empty() =>
			{
				trace!("Read word cache: {}", cache.display());
				return Ok((trie, true))
			},
			Ok(_) => trace!("Ignoring empty word cache: {}", cache.display()),
			Err(e) => trace!("Ignoring word cache: {}: {}", cache.display(), e)
		}
	}

	on_rebuild(true);
	let trie = fs::read(source)
		.map_err(|e| DictionaryError::Io(source.to_path_buf(), e))
		.and_then(|content| build(&content));
	on_rebuild(false);
	let trie = trie?;
	trace!("Read dictionary source: {} ({} words)", source.display(), trie.len());

	match fs::create_dir_all(cache_dir)
		.map_err(CacheError::from)
		.and_then(|_| trie.serialize_to_file(&cache))
	{
		Ok(_) => trace!("Wrote word cache: {}", cache.display()),
		Err(e) => warn!("Failed to write word cache: {}: {}", cache.display(), e)
	}
	Ok((trie, false))
}

/// The complete enumeration of dictionary errors.
#[derive(Debug, Error)]
pub enum DictionaryError
{
	/// The dictionary source could not be read.
	#[error("Unable to read word list from file: {0}: {1}")]
	Io(PathBuf, #[source] io::Error),

	/// The dictionary source is not valid UTF-8.
	#[error("Unable to read word list from file: {0}")]
	InvalidUtf8(#[from] str::Utf8Error),

	/// The dictionary source contains no valid words.
	#[error("Unable to read word list from file: no valid words")]
	Empty
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test
{
	use std::{
		fs::{self, File},
		path::Path,
		time::{Duration, SystemTime}
	};

	use crate::{
		dictionary::{build, cache_path, open, parse, DictionaryError},
		trie::Trie
	};
	use tempfile::TempDir;

	/// The path to the sample dictionary.
	#[inline]
	#[must_use]
	const fn test_path() -> &'static str { "data/words.txt" }

	/// Test parsing of entries with and without alternate spellings.
	#[test]
	fn test_parse()
	{
		let words = parse(
			"cat\n\
			 \n\
			 naive naive naïve\n\
			 ox\n\
			 Cooperate   cooperate coöperate  \n\
			 abcdefghijklmnopqrstuvwxyz\n"
		);
		assert_eq!(words.len(), 3);
		assert_eq!(words["CAT"], vec!["cat"]);
		assert_eq!(words["NAIVE"], vec!["naive", "naïve"]);
		assert_eq!(words["COOPERATE"], vec!["cooperate", "coöperate"]);
		assert!(!words.contains_key("OX"));
		assert!(!words.contains_key("ABCDEFGHIJKLMNOPQRSTUVWXYZ"));
	}

	/// Test building a trie from raw bytes:
	///
	/// * [`build`]
	#[test]
	fn test_build()
	{
		let trie = build(b"cat\ncats\n").unwrap();
		assert_eq!(trie.len(), 2);
		assert!(trie.contains("CAT"));
		assert!(trie.contains("CATS"));
		assert!(matches!(build(b"ox\nat\n"), Err(DictionaryError::Empty)));
		assert!(matches!(build(&[0xff, 0xfe]), Err(DictionaryError::InvalidUtf8(_))));
	}

	/// Test reading the sample dictionary.
	#[test]
	fn test_sample()
	{
		let trie = build(&fs::read(test_path()).unwrap()).unwrap();
		assert!(!trie.is_empty());
		assert!(trie.contains("WORD"));
		assert!(trie.contains("GRID"));
	}

	/// Each source path gets its own stable cache file.
	#[test]
	fn test_cache_path()
	{
		let dir = Path::new("cache");
		let a = cache_path(dir, Path::new("a/words.txt"));
		let b = cache_path(dir, Path::new("b/words.txt"));
		assert_ne!(a, b);
		assert_eq!(a, cache_path(dir, Path::new("a/words.txt")));
		assert_eq!(a.parent(), Some(dir));
	}

	/// Test the cache life cycle of [`open`]: the first open parses the source
	/// and writes the cache, the second reads the cache, and a damaged cache
	/// is silently rebuilt.
	#[test]
	fn test_open()
	{
		let dir = TempDir::new().unwrap();
		let source = dir.path().join("words.txt");
		let cache_dir = dir.path().join("cache");
		fs::write(&source, "cat\ncats\ndog\n").unwrap();
		// Backdate the source, since some file systems have coarse timestamps.
		File::options().write(true).open(&source).unwrap()
			.set_modified(SystemTime::now() - Duration::from_secs(60))
			.unwrap();

		let mut rebuilds = Vec::new();
		let (trie, cached) = open(&source, &cache_dir, |b| rebuilds.push(b))
			.unwrap();
		assert!(!cached);
		assert_eq!(rebuilds, vec![true, false]);
		assert_eq!(trie.len(), 3);
		let cache = cache_path(&cache_dir, &source);
		assert!(cache.exists());

		let (cached_trie, cached) = open(&source, &cache_dir, |_| panic!())
			.unwrap();
		assert!(cached);
		assert_eq!(trie, cached_trie);

		// A cache with the wrong magic number triggers a rebuild.
		let mut content = fs::read(&cache).unwrap();
		content[0] = 0;
		fs::write(&cache, content).unwrap();
		let (rebuilt, cached) = open(&source, &cache_dir, |_| ()).unwrap();
		assert!(!cached);
		assert_eq!(trie, rebuilt);
		assert!(Trie::deserialize_from_file(&cache).is_ok());

		// So does a cache whose header is fine but whose trie is malformed.
		let mut content = fs::read(&cache).unwrap();
		let index = u32::to_le_bytes(1);
		let position = content
			.windows(5)
			.position(|w| w[0] == b'C' && w[1..] == index)
			.unwrap();
		content[position + 4] = 0xff;
		fs::write(&cache, content).unwrap();
		assert!(Trie::deserialize_from_file(&cache).is_err());
		let (rebuilt, cached) = open(&source, &cache_dir, |_| ()).unwrap();
		assert!(!cached);
		assert_eq!(trie, rebuilt);
		assert!(Trie::deserialize_from_file(&cache).is_ok());
	}

	/// A missing source is an error, not a panic.
	#[test]
	fn test_open_missing()
	{
		let dir = TempDir::new().unwrap();
		let result = open(&dir.path().join("nope.txt"), dir.path(), |_| ());
		assert!(matches!(result, Err(DictionaryError::Io(_, _))));
	}
}
