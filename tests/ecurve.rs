use uproc::alphabet::Alphabet;
use uproc::ecurve::{EcurveBuilder, LookupKind};
use uproc::word::Word;

fn alpha() -> Alphabet {
    Alphabet::new("AGSTPKRQEDNHYWFMLIVC").unwrap()
}

#[test]
fn multi_rank_ecurve_keeps_ranks_independent() {
    let mut builder = EcurveBuilder::create(alpha(), 3).unwrap();
    builder
        .add_prefix(5, &[(10, vec![1, 2, 3]), (20, vec![4, 5, 6])])
        .unwrap();
    let ec = builder.finalize().unwrap();

    let hit = ec.lookup(&Word { prefix: 5, suffix: 10 });
    assert_eq!(hit.kind, LookupKind::Exact);
    assert_eq!(hit.lower_classes, &[1, 2, 3]);

    let hit2 = ec.lookup(&Word { prefix: 5, suffix: 20 });
    assert_eq!(hit2.lower_classes, &[4, 5, 6]);
}

#[test]
fn a_populated_single_prefix_ecurve_resolves_every_out_of_range_lookup() {
    let mut builder = EcurveBuilder::create(alpha(), 1).unwrap();
    builder.add_prefix(100, &[(1, vec![9])]).unwrap();
    let ec = builder.finalize().unwrap();

    let below = ec.lookup(&Word { prefix: 0, suffix: 0 });
    let above = ec.lookup(&Word { prefix: 1_000_000, suffix: 0 });
    assert_eq!(below.kind, LookupKind::Oob);
    assert_eq!(above.kind, LookupKind::Oob);
    assert_eq!(below.lower_classes, &[9]);
    assert_eq!(above.lower_classes, &[9]);
}

#[test]
fn a_suffix_past_one_populated_prefixs_range_brackets_against_the_next_prefix() {
    // Two populated prefixes, 10 apart, each holding a single suffix.
    // Anything strictly between the two stored words must come back
    // INEXACT bracketed by those two words, never clamped as OOB within
    // whichever prefix the query's own prefix field happens to name.
    let mut builder = EcurveBuilder::create(alpha(), 1).unwrap();
    builder.add_prefix(10, &[(200, vec![1])]).unwrap();
    builder.add_prefix(20, &[(50, vec![2])]).unwrap();
    let ec = builder.finalize().unwrap();

    let l = ec.lookup(&Word { prefix: 10, suffix: 250 });
    assert_eq!(l.kind, LookupKind::Inexact);
    assert_eq!(l.lower_word, Word { prefix: 10, suffix: 200 });
    assert_eq!(l.upper_word, Word { prefix: 20, suffix: 50 });
    assert_eq!(l.lower_classes, &[1]);
    assert_eq!(l.upper_classes, &[2]);
}

#[test]
fn builder_finalize_without_any_prefix_fails() {
    let builder = EcurveBuilder::create(alpha(), 1).unwrap();
    assert!(builder.finalize().is_err());
}
