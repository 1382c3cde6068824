// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Classifies a single protein sequence by walking its words against a
//! forward and/or reverse ecurve.

use fxhash::FxHashMap;

use crate::alphabet::Alphabet;
use crate::ecurve::Ecurve;
use crate::error::{Error, Result};
use crate::idmap::{Family, INVALID_FAMILY};
use crate::mosaic::MosaicAccumulator;
use crate::substmat::SubstMat;
use crate::word::{Word, WordIter};

use super::{apply_mode, ClassResult, Mode};

/// Classifies protein sequences against a forward and/or reverse ecurve.
pub struct ProteinClassifier<'a> {
    alphabet: &'a Alphabet,
    substmat: &'a SubstMat,
    fwd: Option<&'a Ecurve>,
    rev: Option<&'a Ecurve>,
    mode: Mode,
    detailed: bool,
}

impl<'a> ProteinClassifier<'a> {
    /// At least one of `fwd`/`rev` must be given.
    pub fn new(
        alphabet: &'a Alphabet,
        substmat: &'a SubstMat,
        fwd: Option<&'a Ecurve>,
        rev: Option<&'a Ecurve>,
        mode: Mode,
        detailed: bool,
    ) -> Result<Self> {
        if fwd.is_none() && rev.is_none() {
            return Err(Error::invalid_argument(
                "protein classifier requires at least one ecurve",
            ));
        }
        Ok(ProteinClassifier {
            alphabet,
            substmat,
            fwd,
            rev,
            mode,
            detailed,
        })
    }

    fn ranks_count(&self) -> usize {
        self.fwd
            .or(self.rev)
            .map(Ecurve::ranks_count)
            .expect("constructor requires at least one ecurve")
    }

    fn add_word(
        &self,
        scores: &mut [FxHashMap<Family, MosaicAccumulator>],
        word: &Word,
        index: usize,
        reverse: bool,
        ecurve: Option<&Ecurve>,
    ) {
        let ecurve = match ecurve {
            Some(e) => e,
            None => return,
        };
        let lookup = ecurve.lookup(word);
        let mut neighbors: Vec<(Word, &[Family])> = Vec::with_capacity(2);
        if lookup.lower_word == lookup.upper_word {
            neighbors.push((lookup.upper_word, lookup.upper_classes));
        } else {
            neighbors.push((lookup.lower_word, lookup.lower_classes));
            neighbors.push((lookup.upper_word, lookup.upper_classes));
        }

        for (neighbor_word, classes) in &neighbors {
            let dist = self.substmat.align_suffixes(word.suffix, neighbor_word.suffix);
            for (rank, &class) in classes.iter().enumerate() {
                if class == INVALID_FAMILY {
                    continue;
                }
                scores[rank]
                    .entry(class)
                    .or_insert_with(|| MosaicAccumulator::new(self.detailed))
                    .add(Some(neighbor_word), index, &dist, reverse);
            }
        }
    }

    /// Classify `seq`, keeping only the `(rank, class)` results for which
    /// `filter(seq, seq.len(), class, score)` returns true.
    pub fn classify<F>(&self, seq: &str, mut filter: F) -> Vec<ClassResult>
    where
        F: FnMut(&str, usize, Family, f64) -> bool,
    {
        let ranks_count = self.ranks_count();
        let mut scores: Vec<FxHashMap<Family, MosaicAccumulator>> =
            (0..ranks_count).map(|_| FxHashMap::default()).collect();

        for (index, fwd, rev) in WordIter::new(seq, self.alphabet) {
            self.add_word(&mut scores, &fwd, index, false, self.fwd);
            self.add_word(&mut scores, &rev, index, true, self.rev);
        }

        let mut results = Vec::new();
        for (rank, accumulators) in scores.into_iter().enumerate() {
            for (class, mut mosaic) in accumulators {
                let score = mosaic.finalize();
                if !filter(seq, seq.len(), class, score) {
                    continue;
                }
                results.push(ClassResult {
                    rank,
                    class,
                    score,
                    words: mosaic.take_words(),
                });
            }
        }

        apply_mode(results, self.mode)
    }
}

impl<'a> super::Classify for ProteinClassifier<'a> {
    fn classify_all(&self, seq: &str) -> Vec<ClassResult> {
        self.classify(seq, |_, _, _, _| true)
    }
}
