// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Wraps a [`ProteinClassifier`] over the translated ORFs of a nucleotide
//! sequence, keeping the highest-scoring ORF per `(rank, class)`.

use std::collections::HashMap;

use crate::codon::CodonScores;
use crate::idmap::Family;
use crate::orf::{find_orfs, Orf};

use super::protein::ProteinClassifier;
use super::{apply_mode, ClassResult, Mode};

/// A DNA classification result: the winning `(rank, class)` score plus the
/// ORF it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct DnaResult {
    pub rank: usize,
    pub class: Family,
    pub score: f64,
    pub orf: Orf,
}

/// Classifies nucleotide sequences by extracting ORFs and classifying each
/// as a protein, merging results across ORFs.
pub struct DnaClassifier<'a> {
    protein: &'a ProteinClassifier<'a>,
    codon_scores: &'a CodonScores,
    mode: Mode,
}

impl<'a> DnaClassifier<'a> {
    pub fn new(protein: &'a ProteinClassifier<'a>, codon_scores: &'a CodonScores, mode: Mode) -> Self {
        DnaClassifier {
            protein,
            codon_scores,
            mode,
        }
    }

    /// `orf_filter` selects which ORFs are classified at all;
    /// `result_filter` is forwarded to the inner protein classifier's
    /// per-sequence filter.
    pub fn classify<OF, RF>(
        &self,
        seq: &[u8],
        mut orf_filter: OF,
        mut result_filter: RF,
    ) -> Vec<DnaResult>
    where
        OF: FnMut(&Orf, &[u8], usize, f64) -> bool,
        RF: FnMut(&str, usize, Family, f64) -> bool,
    {
        let orfs = find_orfs(seq, Some(self.codon_scores), |orf, s, len, gc| {
            orf_filter(orf, s, len, gc)
        });

        // (rank, class) -> best result seen so far, with its winning ORF.
        let mut best: HashMap<(usize, Family), DnaResult> = HashMap::new();

        for orf in orfs {
            let protein_results = self.protein.classify(&orf.protein, &mut result_filter);
            for r in protein_results {
                let key = (r.rank, r.class);
                let replace = match best.get(&key) {
                    Some(existing) => r.score > existing.score,
                    None => true,
                };
                if replace {
                    best.insert(
                        key,
                        DnaResult {
                            rank: r.rank,
                            class: r.class,
                            score: r.score,
                            orf: orf.clone(),
                        },
                    );
                }
            }
        }

        let mut results: Vec<ClassResult> = best
            .values()
            .map(|r| ClassResult {
                rank: r.rank,
                class: r.class,
                score: r.score,
                words: None,
            })
            .collect();
        // Reuse the protein classifier's rank/score/class ordering, then
        // re-attach each surviving entry's winning ORF.
        results = apply_mode(results.clone(), self.mode);
        let by_key: HashMap<(usize, Family), DnaResult> =
            best.into_iter().collect();
        results
            .into_iter()
            .filter_map(|r| by_key.get(&(r.rank, r.class)).cloned())
            .collect()
    }
}

impl<'a> super::Classify for DnaClassifier<'a> {
    fn classify_all(&self, seq: &str) -> Vec<ClassResult> {
        self.classify(seq.as_bytes(), |_, _, _, _| true, |_, _, _, _| true)
            .into_iter()
            .map(|r| ClassResult {
                rank: r.rank,
                class: r.class,
                score: r.score,
                words: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::ecurve::EcurveBuilder;
    use crate::substmat::SubstMat;
    use crate::word::Word;
    use ndarray::Array3;

    fn alpha() -> Alphabet {
        Alphabet::new("AGSTPKRQEDNHYWFMLIVC").unwrap()
    }

    fn uniform_substmat(score: f64) -> SubstMat {
        SubstMat::new(Array3::from_elem(
            (crate::word::SUFFIX_LEN, crate::alphabet::ALPHABET_SIZE, crate::alphabet::ALPHABET_SIZE),
            score,
        ))
        .unwrap()
    }

    fn codon_for(amino: u8) -> &'static str {
        match amino {
            b'M' => "ATG",
            b'N' => "AAT",
            b'E' => "GAA",
            b'R' => "CGT",
            b'D' => "GAT",
            b'G' => "GGT",
            b'K' => "AAA",
            b'P' => "CCT",
            b'T' => "ACT",
            _ => unreachable!("test only uses aminos covered above"),
        }
    }

    fn dna_encoding(protein: &str) -> String {
        let mut dna = String::from("ATG");
        for c in protein.bytes() {
            dna.push_str(codon_for(c));
        }
        dna.push_str("TAA");
        dna
    }

    #[test]
    fn keeps_highest_scoring_orf_per_class() {
        let alphabet = alpha();
        let protein_word = "NERDGEEKPETERPETER";
        let w = Word::from_str(protein_word, &alphabet).unwrap();

        let mut builder = EcurveBuilder::create(alphabet.clone(), 1).unwrap();
        builder.add_prefix(w.prefix, &[(w.suffix, vec![3])]).unwrap();
        let fwd = builder.finalize().unwrap();
        let substmat = uniform_substmat(1.0);
        let protein =
            ProteinClassifier::new(&alphabet, &substmat, Some(&fwd), None, Mode::All, false).unwrap();

        let raw = [0.0; crate::codon::EXACT_CODON_COUNT];
        let codon_scores = CodonScores::new(raw);
        let dna = DnaClassifier::new(&protein, &codon_scores, Mode::All);

        let seq = dna_encoding(&format!("M{}", protein_word));
        let results = dna.classify(seq.as_bytes(), |_, _, _, _| true, |_, _, _, _| true);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].class, 3);
        assert_eq!(results[0].orf.frame, 0);
    }

    #[test]
    fn orf_free_sequence_yields_no_results() {
        let alphabet = alpha();
        let protein_word = "NERDGEEKPETERPETER";
        let w = Word::from_str(protein_word, &alphabet).unwrap();
        let mut builder = EcurveBuilder::create(alphabet.clone(), 1).unwrap();
        builder.add_prefix(w.prefix, &[(w.suffix, vec![3])]).unwrap();
        let fwd = builder.finalize().unwrap();
        let substmat = uniform_substmat(1.0);
        let protein =
            ProteinClassifier::new(&alphabet, &substmat, Some(&fwd), None, Mode::All, false).unwrap();
        let raw = [0.0; crate::codon::EXACT_CODON_COUNT];
        let codon_scores = CodonScores::new(raw);
        let dna = DnaClassifier::new(&protein, &codon_scores, Mode::All);

        let results = dna.classify(b"ATGTAA", |_, _, _, _| true, |_, _, _, _| true);
        assert!(results.is_empty());
    }
}
