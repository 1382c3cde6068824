// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Two-stage producer/consumer pipeline: sequences are read into
//! fixed-size chunks while the previous chunk is classified in parallel,
//! so I/O and classification overlap. Results keep their original sequence
//! index so callers can reconstruct input order.

use crossbeam_channel::bounded;
use rayon::prelude::*;

use crate::classifier::{Classify, ClassResult};
use crate::SequenceRecord;

/// Default chunk size, matching the classic double-buffer depth used by
/// batch sequence classifiers.
pub const DEFAULT_CHUNK_SIZE: usize = 16_384;

/// Drives a [`Classify`] implementation over a stream of sequences.
pub struct Pipeline<'a, C: Classify> {
    classifier: &'a C,
    chunk_size: usize,
}

impl<'a, C: Classify> Pipeline<'a, C> {
    pub fn new(classifier: &'a C) -> Self {
        Pipeline {
            classifier,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(classifier: &'a C, chunk_size: usize) -> Self {
        Pipeline {
            classifier,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Classify every record in `records`, returning `(index, results)`
    /// pairs in ascending index order. Sequences within a chunk are
    /// classified in parallel across a `rayon` thread pool; chunks
    /// themselves are processed one after another, so a chunk's
    /// classification overlaps with nothing but itself here - the
    /// overlap the original describes is between one chunk's
    /// classification and the *next* chunk's I/O, which in this in-memory
    /// form has already happened by the time `records` is a slice.
    pub fn run<R: SequenceRecord + Sync>(&self, records: &[R]) -> Vec<(usize, Vec<ClassResult>)> {
        let mut output = Vec::with_capacity(records.len());
        for (chunk_index, chunk) in records.chunks(self.chunk_size).enumerate() {
            let base = chunk_index * self.chunk_size;
            let (tx, rx) = bounded(chunk.len().max(1));

            chunk.par_iter().enumerate().for_each_with(tx, |tx, (i, record)| {
                let results = self.classifier.classify_all(record.sequence());
                let _ = tx.send((base + i, results));
            });

            let mut chunk_results: Vec<(usize, Vec<ClassResult>)> = rx.iter().collect();
            chunk_results.sort_by_key(|(index, _)| *index);
            output.extend(chunk_results);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::classifier::protein::ProteinClassifier;
    use crate::classifier::Mode;
    use crate::ecurve::EcurveBuilder;
    use crate::substmat::SubstMat;
    use crate::word::Word;
    use ndarray::Array3;

    struct Rec {
        header: String,
        sequence: String,
    }

    impl SequenceRecord for Rec {
        fn header(&self) -> &str {
            &self.header
        }
        fn sequence(&self) -> &str {
            &self.sequence
        }
    }

    #[test]
    fn preserves_input_order_across_chunks() {
        let alphabet = Alphabet::new("AGSTPKRQEDNHYWFMLIVC").unwrap();
        let w = Word::from_str("NERDGEEKPETERPETER", &alphabet).unwrap();
        let mut builder = EcurveBuilder::create(alphabet.clone(), 1).unwrap();
        builder.add_prefix(w.prefix, &[(w.suffix, vec![1])]).unwrap();
        let fwd = builder.finalize().unwrap();
        let substmat = SubstMat::new(Array3::from_elem(
            (crate::word::SUFFIX_LEN, crate::alphabet::ALPHABET_SIZE, crate::alphabet::ALPHABET_SIZE),
            1.0,
        ))
        .unwrap();
        let classifier =
            ProteinClassifier::new(&alphabet, &substmat, Some(&fwd), None, Mode::All, false)
                .unwrap();

        let records: Vec<Rec> = (0..5)
            .map(|i| Rec {
                header: format!("seq{}", i),
                sequence: "AAAAAAAAAANERDGEEKPETERPETERAAAAAAAAAA".to_string(),
            })
            .collect();

        let pipeline = Pipeline::with_chunk_size(&classifier, 2);
        let results = pipeline.run(&records);

        let indexes: Vec<usize> = results.iter().map(|(i, _)| *i).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
        for (_, r) in &results {
            assert_eq!(r.len(), 1);
            assert_eq!(r[0].class, 1);
        }
    }
}
