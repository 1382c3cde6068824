// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Builds forward and reverse ecurves from a classified sequence stream:
//! per leading-amino-acid bucket, deduplicates words, labels runs of
//! same-class neighbors, and invalidates noise before handing the survivors
//! to [`crate::ecurve::EcurveBuilder`].
//!
//! FASTA parsing and class-name resolution happen upstream of this module;
//! callers supply sequences already paired with their resolved per-rank
//! class tuples.

pub mod calib;

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::alphabet::{Alphabet, Amino, ALPHABET_SIZE};
use crate::ecurve::{Ecurve, EcurveBuilder};
use crate::error::Result;
use crate::idmap::{Family, INVALID_FAMILY};
use crate::word::{Word, WordIter};
use crate::SequenceRecord;

/// One input record: a header and sequence already paired with their
/// resolved class at every rank (`classes.len()` must equal the builder's
/// `ranks_count`). Class-name resolution (FASTA header -> [`Family`] via an
/// [`crate::idmap::IdMap`]) happens upstream of this module.
#[derive(Clone, Debug)]
pub struct ClassifiedRecord {
    pub header: String,
    pub sequence: String,
    pub classes: Vec<Family>,
}

impl SequenceRecord for ClassifiedRecord {
    fn header(&self) -> &str {
        &self.header
    }
    fn sequence(&self) -> &str {
        &self.sequence
    }
}

/// Callback for long-running builder/calibration routines to report
/// progress, taking an explicit sink rather than writing to global state.
/// `label` names the stage that just started (`percent < 0`) or is in
/// progress.
pub trait Progress {
    fn report(&mut self, label: &str, percent: f64);
}

/// A [`Progress`] that discards every report.
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _label: &str, _percent: f64) {}
}

/// Counts of words dropped at each filtering stage, across all 20 buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterCounts {
    /// Rank slots invalidated because the same word mapped to two different
    /// classes somewhere in the input.
    pub collisions: u64,
    /// Rank slots invalidated because the word had no same-class neighbor
    /// (`SINGLE`) or sat in an `ABAB`/nested-`ABA` pattern (`CROSSOVER`).
    pub noise: u64,
    /// Entries dropped entirely because every rank ended up invalid and
    /// `purge` was requested.
    pub purged: u64,
}

/// Label assigned to a word by neighbor-pattern inspection, independently
/// per rank. Mirrors the four cases the original ecurve builder
/// distinguishes; only `Cluster` and `Bridged` entries keep their class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum RankLabel {
    #[default]
    Single,
    Cluster,
    Bridged,
    Crossover,
}

/// Builds a single ecurve (forward or reverse) from classified sequences.
pub struct DatabaseBuilder<'a> {
    alphabet: &'a Alphabet,
    ranks_count: usize,
    /// When true, sequences are read back-to-front before word extraction
    /// (as opposed to complemented - the reverse ecurve matches on the
    /// same alphabet, just the opposite read direction).
    reverse: bool,
    /// When true, entries whose every rank ended up invalid are dropped
    /// from the ecurve entirely rather than stored as all-`INVALID_FAMILY`.
    purge: bool,
}

impl<'a> DatabaseBuilder<'a> {
    pub fn new(alphabet: &'a Alphabet, ranks_count: usize, reverse: bool, purge: bool) -> Self {
        DatabaseBuilder {
            alphabet,
            ranks_count,
            reverse,
            purge,
        }
    }

    fn prepared(&self, seq: &str) -> String {
        if self.reverse {
            seq.chars().rev().collect()
        } else {
            seq.to_string()
        }
    }

    /// Deduplicate every 18-mer starting with `first` across all records,
    /// marking a rank invalid wherever the same word maps to two different
    /// classes.
    fn extract_uniques(
        &self,
        records: &[ClassifiedRecord],
        first: Amino,
        counts: &mut FilterCounts,
    ) -> BTreeMap<Word, Vec<Family>> {
        let mut map: BTreeMap<Word, Vec<Family>> = BTreeMap::new();
        for rec in records {
            debug_assert_eq!(rec.classes.len(), self.ranks_count);
            let seq = self.prepared(&rec.sequence);
            for (_, fwd, _rev) in WordIter::new(&seq, self.alphabet) {
                if !fwd.startswith(first) {
                    continue;
                }
                match map.get_mut(&fwd) {
                    Some(existing) => {
                        for rank in 0..self.ranks_count {
                            if existing[rank] != rec.classes[rank] {
                                existing[rank] = INVALID_FAMILY;
                                counts.collisions += 1;
                            }
                        }
                    }
                    None => {
                        map.insert(fwd, rec.classes.clone());
                    }
                }
            }
        }
        map
    }

    /// Label each entry's rank by same-class-neighbor pattern, then
    /// invalidate the `SINGLE` and `CROSSOVER` labels.
    ///
    /// `|AA..|` -> both `CLUSTER`. `|ABA.|` -> `BRIDGED` unless it chains
    /// into a wider `CROSSOVER` (`ABAB`, or nesting inside an
    /// already-bridged/crossover run).
    fn label_and_invalidate(&self, entries: &mut [(Word, Vec<Family>)], counts: &mut FilterCounts) {
        for rank in 0..self.ranks_count {
            // Entries a collision already invalidated for this rank take no
            // part in neighbor labeling: they sit out of the positional
            // sequence entirely, the same way the array they'd otherwise
            // perturb is compacted before its own neighbor pass runs.
            let live: Vec<usize> = (0..entries.len())
                .filter(|&i| entries[i].1[rank] != INVALID_FAMILY)
                .collect();
            let n = live.len();
            let mut labels = vec![RankLabel::Single; n];
            let class_at = |k: usize| entries[live[k]].1[rank];

            for i in 0..n {
                if i < n - 1 && class_at(i) == class_at(i + 1) {
                    labels[i] = RankLabel::Cluster;
                    labels[i + 1] = RankLabel::Cluster;
                } else if i < n.saturating_sub(2) && class_at(i) == class_at(i + 2) {
                    if labels[i + 1] == RankLabel::Bridged || labels[i + 1] == RankLabel::Crossover
                    {
                        labels[i] = RankLabel::Crossover;
                        labels[i + 1] = RankLabel::Crossover;
                        labels[i + 2] = RankLabel::Crossover;
                    } else if i < n.saturating_sub(3)
                        && labels[i] != RankLabel::Cluster
                        && class_at(i + 1) == class_at(i + 3)
                    {
                        labels[i] = RankLabel::Crossover;
                        labels[i + 1] = RankLabel::Crossover;
                        labels[i + 2] = RankLabel::Crossover;
                        labels[i + 3] = RankLabel::Crossover;
                    } else {
                        if labels[i] != RankLabel::Cluster && labels[i] != RankLabel::Crossover {
                            labels[i] = RankLabel::Bridged;
                        }
                        labels[i + 2] = RankLabel::Bridged;
                    }
                }
            }

            for (k, label) in labels.into_iter().enumerate() {
                if label != RankLabel::Cluster && label != RankLabel::Bridged {
                    let i = live[k];
                    counts.noise += 1;
                    entries[i].1[rank] = INVALID_FAMILY;
                }
            }
        }
    }

    /// Build one ecurve from every bucket of `records`.
    pub fn build(&self, records: &[ClassifiedRecord]) -> Result<(Ecurve, FilterCounts)> {
        self.build_with_progress(records, &mut NoProgress)
    }

    /// Like [`Self::build`], reporting `label`/percent-complete to
    /// `progress` once per leading-amino bucket.
    pub fn build_with_progress(
        &self,
        records: &[ClassifiedRecord],
        progress: &mut impl Progress,
    ) -> Result<(Ecurve, FilterCounts)> {
        let mut builder = EcurveBuilder::create(self.alphabet.clone(), self.ranks_count)?;
        let mut counts = FilterCounts::default();
        let label = if self.reverse { "rev.ecurve" } else { "fwd.ecurve" };
        progress.report(label, -1.0);

        for first in 0..ALPHABET_SIZE as Amino {
            progress.report(label, first as f64 * 100.0 / ALPHABET_SIZE as f64);
            let map = self.extract_uniques(records, first, &mut counts);
            let mut entries: Vec<(Word, Vec<Family>)> = map.into_iter().collect();
            if entries.is_empty() {
                continue;
            }
            self.label_and_invalidate(&mut entries, &mut counts);

            if self.purge {
                let before = entries.len();
                entries.retain(|(_, classes)| classes.iter().any(|&c| c != INVALID_FAMILY));
                counts.purged += (before - entries.len()) as u64;
            }
            if entries.is_empty() {
                continue;
            }

            for (prefix, group) in &entries.into_iter().group_by(|(word, _)| word.prefix) {
                let run: Vec<(u32, Vec<Family>)> =
                    group.map(|(word, classes)| (word.suffix, classes)).collect();
                builder.add_prefix(prefix, &run)?;
            }
        }

        progress.report(label, 100.0);
        Ok((builder.finalize()?, counts))
    }
}

/// Build both the forward and reverse ecurves for a database.
pub fn build_ecurves(
    alphabet: &Alphabet,
    ranks_count: usize,
    purge: bool,
    records: &[ClassifiedRecord],
    progress: &mut impl Progress,
) -> Result<(Ecurve, Ecurve, FilterCounts, FilterCounts)> {
    let fwd_builder = DatabaseBuilder::new(alphabet, ranks_count, false, purge);
    let (fwd, fwd_counts) = fwd_builder.build_with_progress(records, progress)?;
    let rev_builder = DatabaseBuilder::new(alphabet, ranks_count, true, purge);
    let (rev, rev_counts) = rev_builder.build_with_progress(records, progress)?;
    Ok((fwd, rev, fwd_counts, rev_counts))
}
