// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! The "evolutionary curve": a memory-mappable word→class index exploiting
//! lexicographic word ordering for fast nearest-neighbour lookup.
//!
//! Conceptually there is one entry per possible 12-amino prefix (`20^12` of
//! them), each pointing at a run of sorted suffixes. That space is far too
//! large to hold as a dense array, so only the *populated* prefixes are
//! stored, keyed in a [`BTreeMap`] that gives the same exact/nearest-
//! neighbour queries a dense array with edge sentinels would.
//!
//! Every word maps to a class *tuple*, one class per rank (typically one
//! rank, up to [`RANKS_MAX`]).

pub mod storage;

use std::collections::BTreeMap;

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};
use crate::idmap::Family;
use crate::word::Word;

/// Upper bound on the number of ranks an ecurve may carry per word.
pub const RANKS_MAX: usize = 4;

/// Range of suffixes (and parallel class rows) associated with one
/// populated prefix, as `suffixes[first..first+count)`.
#[derive(Clone, Copy, Debug)]
struct PrefixRange {
    first: u64,
    count: u32,
}

/// Outcome of an ecurve [`Ecurve::lookup`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKind {
    /// `word` itself is present in the index; `lower == upper`.
    Exact,
    /// `word` falls strictly between two indexed words sharing the
    /// relevant prefix range.
    Inexact,
    /// `word` falls outside the populated prefix range entirely; `lower`
    /// and `upper` both saturate to the nearest populated boundary.
    Oob,
}

/// Result of a lookup: the bracketing neighbour words and their per-rank
/// class tuples.
#[derive(Clone, Copy, Debug)]
pub struct Lookup<'a> {
    pub kind: LookupKind,
    pub lower_word: Word,
    pub lower_classes: &'a [Family],
    pub upper_word: Word,
    pub upper_classes: &'a [Family],
}

/// The index itself: sorted suffixes/classes, addressed through a sparse
/// map of populated prefixes.
#[derive(Clone, Debug)]
pub struct Ecurve {
    alphabet: Alphabet,
    ranks_count: usize,
    prefixes: BTreeMap<u64, PrefixRange>,
    suffixes: Vec<u32>,
    /// `classes[i * ranks_count .. (i + 1) * ranks_count]` are the class
    /// tuple for `suffixes[i]`.
    classes: Vec<Family>,
}

impl Ecurve {
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn ranks_count(&self) -> usize {
        self.ranks_count
    }

    pub fn suffix_count(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    fn classes_at(&self, index: u64) -> &[Family] {
        let i = index as usize * self.ranks_count;
        &self.classes[i..i + self.ranks_count]
    }

    fn word_at(&self, prefix: u64, index: u64) -> (Word, &[Family]) {
        (
            Word {
                prefix,
                suffix: self.suffixes[index as usize],
            },
            self.classes_at(index),
        )
    }

    fn last_index_of(&self, range: &PrefixRange) -> u64 {
        range.first + range.count as u64 - 1
    }

    /// Find `word`'s bracketing neighbours.
    ///
    /// Panics if the ecurve has no populated prefixes at all; the builder
    /// never produces such an ecurve.
    pub fn lookup(&self, word: &Word) -> Lookup<'_> {
        if let Some(range) = self.prefixes.get(&word.prefix) {
            let (lo, hi, kind) = self.suffix_lookup(*range, word.suffix);
            if kind != LookupKind::Oob {
                let (lower_word, lower_classes) = self.word_at(word.prefix, lo);
                let (upper_word, upper_classes) = self.word_at(word.prefix, hi);
                return Lookup {
                    kind,
                    lower_word,
                    lower_classes,
                    upper_word,
                    upper_classes,
                };
            }
            // `word.suffix` is outside this prefix's own suffix run: the
            // genuine neighbour on the out-of-range side lives in an
            // adjacent populated prefix (if any), not within this prefix.
            if word.suffix < self.suffixes[range.first as usize] {
                let (upper_word, upper_classes) = self.word_at(word.prefix, range.first);
                return match self.prefixes.range(..word.prefix).next_back() {
                    Some((&lo_pfx, lo_range)) => {
                        let lo_idx = self.last_index_of(lo_range);
                        let (lower_word, lower_classes) = self.word_at(lo_pfx, lo_idx);
                        Lookup {
                            kind: LookupKind::Inexact,
                            lower_word,
                            lower_classes,
                            upper_word,
                            upper_classes,
                        }
                    }
                    None => Lookup {
                        kind: LookupKind::Oob,
                        lower_word: upper_word,
                        lower_classes: upper_classes,
                        upper_word,
                        upper_classes,
                    },
                };
            }
            let lower_idx = self.last_index_of(range);
            let (lower_word, lower_classes) = self.word_at(word.prefix, lower_idx);
            return match self
                .prefixes
                .range((std::ops::Bound::Excluded(word.prefix), std::ops::Bound::Unbounded))
                .next()
            {
                Some((&up_pfx, up_range)) => {
                    let (upper_word, upper_classes) = self.word_at(up_pfx, up_range.first);
                    Lookup {
                        kind: LookupKind::Inexact,
                        lower_word,
                        lower_classes,
                        upper_word,
                        upper_classes,
                    }
                }
                None => Lookup {
                    kind: LookupKind::Oob,
                    lower_word,
                    lower_classes,
                    upper_word: lower_word,
                    upper_classes: lower_classes,
                },
            };
        }

        let lower_entry = self.prefixes.range(..word.prefix).next_back();
        let upper_entry = self.prefixes.range(word.prefix..).next();

        match (lower_entry, upper_entry) {
            (None, None) => panic!("lookup on an ecurve with no populated prefixes"),
            (None, Some((&up_pfx, up_range))) => {
                let (w, c) = self.word_at(up_pfx, up_range.first);
                Lookup {
                    kind: LookupKind::Oob,
                    lower_word: w,
                    lower_classes: c,
                    upper_word: w,
                    upper_classes: c,
                }
            }
            (Some((&lo_pfx, lo_range)), None) => {
                let idx = self.last_index_of(lo_range);
                let (w, c) = self.word_at(lo_pfx, idx);
                Lookup {
                    kind: LookupKind::Oob,
                    lower_word: w,
                    lower_classes: c,
                    upper_word: w,
                    upper_classes: c,
                }
            }
            (Some((&lo_pfx, lo_range)), Some((&up_pfx, up_range))) => {
                let lo_idx = self.last_index_of(lo_range);
                let (lw, lc) = self.word_at(lo_pfx, lo_idx);
                let (uw, uc) = self.word_at(up_pfx, up_range.first);
                Lookup {
                    kind: LookupKind::Inexact,
                    lower_word: lw,
                    lower_classes: lc,
                    upper_word: uw,
                    upper_classes: uc,
                }
            }
        }
    }

    /// Binary search within one prefix's suffix run, returning global
    /// `(lower_index, upper_index, kind)`.
    fn suffix_lookup(&self, range: PrefixRange, key: u32) -> (u64, u64, LookupKind) {
        let first = range.first as usize;
        let n = range.count as usize;
        let search = &self.suffixes[first..first + n];

        if key < search[0] {
            return (range.first, range.first, LookupKind::Oob);
        }
        if key > search[n - 1] {
            let last = range.first + n as u64 - 1;
            return (last, last, LookupKind::Oob);
        }
        match search.binary_search(&key) {
            Ok(i) => {
                let idx = range.first + i as u64;
                (idx, idx, LookupKind::Exact)
            }
            Err(i) => {
                // `i` is the insertion point: search[i-1] < key < search[i].
                let lower = range.first + (i - 1) as u64;
                let upper = range.first + i as u64;
                (lower, upper, LookupKind::Inexact)
            }
        }
    }
}

/// Incrementally assembles an [`Ecurve`] from sorted, deduplicated
/// per-prefix suffix runs, in ascending prefix order.
pub struct EcurveBuilder {
    alphabet: Alphabet,
    ranks_count: usize,
    prefixes: BTreeMap<u64, PrefixRange>,
    suffixes: Vec<u32>,
    classes: Vec<Family>,
    last_prefix: Option<u64>,
}

impl EcurveBuilder {
    pub fn create(alphabet: Alphabet, ranks_count: usize) -> Result<Self> {
        if ranks_count == 0 || ranks_count > RANKS_MAX {
            return Err(Error::invalid_argument(format!(
                "ranks_count must be in 1..={}, got {}",
                RANKS_MAX, ranks_count
            )));
        }
        Ok(EcurveBuilder {
            alphabet,
            ranks_count,
            prefixes: BTreeMap::new(),
            suffixes: Vec::new(),
            classes: Vec::new(),
            last_prefix: None,
        })
    }

    /// Add one prefix's suffix run. `entries` must be sorted ascending by
    /// suffix and non-empty, each carrying exactly `ranks_count` classes;
    /// `prefix` must be strictly greater than every previously added
    /// prefix.
    pub fn add_prefix(&mut self, prefix: u64, entries: &[(u32, Vec<Family>)]) -> Result<()> {
        if entries.is_empty() {
            return Err(Error::invalid_argument("empty suffix list"));
        }
        if let Some(last) = self.last_prefix {
            if prefix <= last {
                return Err(Error::invalid_argument(
                    "new prefix must be greater than last nonempty",
                ));
            }
        }
        debug_assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "suffix entries must be sorted and deduplicated"
        );

        let first = self.suffixes.len() as u64;
        for (suffix, classes) in entries {
            if classes.len() != self.ranks_count {
                return Err(Error::invalid_argument(format!(
                    "expected {} classes per suffix, got {}",
                    self.ranks_count,
                    classes.len()
                )));
            }
            self.suffixes.push(*suffix);
            self.classes.extend_from_slice(classes);
        }
        self.prefixes.insert(
            prefix,
            PrefixRange {
                first,
                count: entries.len() as u32,
            },
        );
        self.last_prefix = Some(prefix);
        Ok(())
    }

    /// Finish building. Fails if no prefix was ever added.
    pub fn finalize(self) -> Result<Ecurve> {
        if self.last_prefix.is_none() {
            return Err(Error::invalid_argument("ecurve has no populated prefixes"));
        }
        Ok(Ecurve {
            alphabet: self.alphabet,
            ranks_count: self.ranks_count,
            prefixes: self.prefixes,
            suffixes: self.suffixes,
            classes: self.classes,
        })
    }
}
