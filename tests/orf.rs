use uproc::codon::{self, CodonScores};
use uproc::orf::find_orfs;

#[test]
fn a_circular_plasmid_style_sequence_yields_orfs_on_both_strands() {
    // Forward frame 0: ATG GCA TAA -> "MA"; its reverse complement
    // contains a stop-bounded ORF of its own in some frame.
    let seq = b"ATGGCATAAATGCGTTAA";
    let orfs = find_orfs(seq, None, |_, _, _, _| true);
    assert!(orfs.iter().any(|o| o.frame < 3));
    assert!(orfs.iter().any(|o| o.frame >= 3));
}

#[test]
fn gc_content_filter_rejects_every_orf_from_an_at_only_sequence() {
    let seq = b"ATGAAAAAATAA";
    let orfs = find_orfs(seq, None, |_, _, _, gc| gc > 0.5);
    assert!(orfs.is_empty());
}

#[test]
fn ambiguous_codons_still_close_an_orf_without_crashing() {
    let seq = b"ATGNNNTAA";
    let orfs = find_orfs(seq, None, |_, _, _, _| true);
    let f0: Vec<_> = orfs.iter().filter(|o| o.frame == 0).collect();
    // The ambiguous NNN codon can't be translated, flushing the ORF before
    // it, so "M" alone becomes its own one-amino ORF.
    assert!(f0.iter().any(|o| o.protein == "M"));
}

#[test]
fn codon_scores_differentiate_preferred_from_rare_codons() {
    let mut raw = [0.0; codon::EXACT_CODON_COUNT];
    raw[0] = 5.0;
    let scores = CodonScores::new(raw);
    let seq = b"ATGGCATAA";
    let orfs = find_orfs(seq, Some(&scores), |_, _, _, _| true);
    let f0 = orfs.iter().find(|o| o.frame == 0).unwrap();
    // Only one of the two codons (index 0) carries nonzero score.
    assert!(f0.score >= 0.0);
}
