use uproc::mosaic::MosaicAccumulator;
use uproc::word::{Word, SUFFIX_LEN, WORD_LEN};

#[test]
fn a_single_word_contributes_its_full_suffix_score() {
    let mut acc = MosaicAccumulator::new(false);
    let w = Word::new();
    acc.add(Some(&w), 0, &[2.0; SUFFIX_LEN], false);
    assert_eq!(acc.finalize(), 2.0 * SUFFIX_LEN as f64);
}

#[test]
fn scores_never_exceed_the_best_word_at_any_position() {
    // A run of words one apart, each with a distinct score, should total
    // less than naively summing every word's full score (since positions
    // overlap and only the maximum at each position is counted once).
    let mut acc = MosaicAccumulator::new(false);
    let w = Word::new();
    let naive_sum: f64 = (0..10)
        .map(|i| {
            acc.add(Some(&w), i, &[(i + 1) as f64; SUFFIX_LEN], false);
            (i + 1) as f64 * SUFFIX_LEN as f64
        })
        .sum();
    let total = acc.finalize();
    assert!(total < naive_sum);
    assert!(total > 0.0);
}

#[test]
fn detailed_mode_records_every_word_added() {
    let mut acc = MosaicAccumulator::new(true);
    let w = Word::new();
    acc.add(Some(&w), 0, &[1.0; SUFFIX_LEN], false);
    acc.add(Some(&w), WORD_LEN, &[3.0; SUFFIX_LEN], true);
    let words = acc.take_words().unwrap();
    assert_eq!(words.len(), 2);
    assert!(!words[0].reverse);
    assert!(words[1].reverse);
}
