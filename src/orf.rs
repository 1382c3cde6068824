// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Six-frame open reading frame extraction from nucleotide sequences.
//!
//! Three forward frames (offsets 0, 1, 2) and three reverse-complement
//! frames (offsets 0, 1, 2 of the reverse complement) are translated codon
//! by codon; a stop codon or the end of the sequence closes the current
//! ORF.

use crate::codon::{self, Codon, CodonScores};

/// A translated open reading frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Orf {
    /// The translated amino acid string (may contain `'X'` for ambiguous
    /// codons).
    pub protein: String,
    /// Index, in the original (forward-strand) nucleotide sequence, of the
    /// ORF's leftmost nucleotide.
    pub start: usize,
    /// Length of `protein`, in amino acids.
    pub length: usize,
    /// Reading frame: `0..3` forward, `3..6` reverse-complement.
    pub frame: usize,
    /// Sum of per-codon scores, or `0.0` if no [`CodonScores`] was supplied.
    pub score: f64,
}

fn gc_content(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = bytecount::count(seq, b'G')
        + bytecount::count(seq, b'g')
        + bytecount::count(seq, b'C')
        + bytecount::count(seq, b'c');
    gc as f64 / seq.len() as f64
}

fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&c| match codon::char_to_nt(c) {
            Ok(Some(nt)) => complement_char(c, codon::complement_nt(nt)),
            _ => c,
        })
        .collect()
}

fn complement_char(original: u8, complement_mask: u8) -> u8 {
    let upper = match complement_mask {
        codon::NT_A => b'A',
        codon::NT_C => b'C',
        codon::NT_G => b'G',
        codon::NT_T => b'T',
        _ => original,
    };
    if original.is_ascii_lowercase() {
        upper.to_ascii_lowercase()
    } else {
        upper
    }
}

struct Frame<'a> {
    /// Bytes to read codons from, already oriented (forward or reverse
    /// complemented) so codons are read left to right from `offset`.
    bytes: &'a [u8],
    offset: usize,
    /// Frame number reported on emitted ORFs, `0..6`.
    number: usize,
    /// True if `bytes` is the reverse complement of the original sequence.
    reversed: bool,
    original_len: usize,
}

fn orig_start(frame: &Frame, codon_start_in_bytes: usize, length_nt: usize) -> usize {
    if frame.reversed {
        frame.original_len - codon_start_in_bytes - length_nt
    } else {
        codon_start_in_bytes
    }
}

fn extract_frame(frame: &Frame, codon_scores: Option<&CodonScores>) -> Vec<Orf> {
    let mut orfs = Vec::new();
    let mut protein = String::new();
    let mut start = frame.offset;
    let mut score = 0.0;
    let mut pos = frame.offset;

    macro_rules! flush {
        ($end:expr) => {
            if !protein.is_empty() {
                orfs.push(Orf {
                    length: protein.len(),
                    start: orig_start(frame, start, protein.len() * 3),
                    frame: frame.number,
                    score,
                    protein: std::mem::take(&mut protein),
                });
            }
            score = 0.0;
            start = $end;
        };
    }

    while pos + 3 <= frame.bytes.len() {
        match build_codon(&frame.bytes[pos..pos + 3]) {
            None => {
                flush!(pos + 3);
            }
            Some(c) => {
                if codon::is_stop(c) {
                    flush!(pos + 3);
                } else {
                    if protein.is_empty() {
                        start = pos;
                    }
                    protein.push(codon::translate(c) as char);
                    if let Some(scores) = codon_scores {
                        score += scores.score(c);
                    }
                }
            }
        }
        pos += 3;
    }
    flush!(pos);
    orfs
}

fn build_codon(bytes: &[u8]) -> Option<Codon> {
    let mut c = 0;
    for &b in bytes {
        match codon::char_to_nt(b) {
            Ok(Some(nt)) => c = codon::codon_append(c, nt),
            _ => return None,
        }
    }
    Some(c)
}

/// Extracts every ORF from `seq` across all six reading frames, scoring
/// each with `codon_scores` (if given) and keeping only those for which
/// `filter` returns true.
///
/// `filter` receives the candidate ORF, the original sequence, its length,
/// and its GC content.
pub fn find_orfs<F>(seq: &[u8], codon_scores: Option<&CodonScores>, mut filter: F) -> Vec<Orf>
where
    F: FnMut(&Orf, &[u8], usize, f64) -> bool,
{
    let gc = gc_content(seq);
    let rc = revcomp(seq);
    let mut out = Vec::new();
    for number in 0..3 {
        let frame = Frame {
            bytes: seq,
            offset: number,
            number,
            reversed: false,
            original_len: seq.len(),
        };
        out.extend(extract_frame(&frame, codon_scores));
    }
    for number in 0..3 {
        let frame = Frame {
            bytes: &rc,
            offset: number,
            number: number + 3,
            reversed: true,
            original_len: seq.len(),
        };
        out.extend(extract_frame(&frame, codon_scores));
    }
    out.retain(|orf| filter(orf, seq, seq.len(), gc));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_forward_orf_bounded_by_stop_codons() {
        // ATG GCN TAA -> "MA" in frame 0.
        let seq = b"ATGGCATAA";
        let orfs = find_orfs(seq, None, |_, _, _, _| true);
        let f0: Vec<_> = orfs.iter().filter(|o| o.frame == 0).collect();
        assert_eq!(f0.len(), 1);
        assert_eq!(f0[0].protein, "MA");
        assert_eq!(f0[0].start, 0);
        assert_eq!(f0[0].length, 2);
    }

    #[test]
    fn sequence_end_closes_a_trailing_orf_without_a_stop() {
        let seq = b"ATGGCA";
        let orfs = find_orfs(seq, None, |_, _, _, _| true);
        let f0: Vec<_> = orfs.iter().filter(|o| o.frame == 0).collect();
        assert_eq!(f0.len(), 1);
        assert_eq!(f0[0].protein, "MA");
    }

    #[test]
    fn six_frames_are_all_considered() {
        let seq = b"ATGGCATAA";
        let orfs = find_orfs(seq, None, |_, _, _, _| true);
        let frames: std::collections::HashSet<_> = orfs.iter().map(|o| o.frame).collect();
        assert!(frames.iter().all(|&f| f < 6));
    }

    #[test]
    fn filter_can_reject_short_orfs() {
        let seq = b"ATGGCATAA";
        let orfs = find_orfs(seq, None, |orf, _, _, _| orf.length >= 3);
        assert!(orfs.iter().all(|o| o.length >= 3));
    }

    #[test]
    fn codon_scores_accumulate_into_orf_score() {
        let mut raw = [0.0; codon::EXACT_CODON_COUNT];
        raw.iter_mut().for_each(|s| *s = 1.0);
        let scores = CodonScores::new(raw);
        let seq = b"ATGGCATAA";
        let orfs = find_orfs(seq, Some(&scores), |_, _, _, _| true);
        let f0 = orfs.iter().find(|o| o.frame == 0).unwrap();
        assert_eq!(f0.score, 2.0);
    }
}
