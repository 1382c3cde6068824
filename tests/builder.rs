use uproc::alphabet::Alphabet;
use uproc::build::{build_ecurves, ClassifiedRecord, NoProgress};
use uproc::ecurve::LookupKind;
use uproc::word::Word;

fn alpha() -> Alphabet {
    Alphabet::new("AGSTPKRQEDNHYWFMLIVC").unwrap()
}

fn rec(header: &str, class: u32, seq: &str) -> ClassifiedRecord {
    ClassifiedRecord {
        header: header.to_string(),
        sequence: seq.to_string(),
        classes: vec![class],
    }
}

#[test]
fn two_records_sharing_a_window_cluster_and_survive_into_the_ecurve() {
    let alphabet = alpha();
    // Two overlapping-by-one-position 18-mers of the same class should be
    // labeled CLUSTER and survive unfiltered.
    let seq_a = "NERDGEEKPETERPETERA";
    let seq_b = "XNERDGEEKPETERPETER";
    let records = vec![rec("a", 3, seq_a), rec("b", 3, seq_b)];

    let (fwd, rev, fwd_counts, _rev_counts) =
        build_ecurves(&alphabet, 1, false, &records, &mut NoProgress).unwrap();

    assert!(!fwd.is_empty());
    assert!(!rev.is_empty());
    assert_eq!(fwd_counts.collisions, 0);

    let w = Word::from_str("NERDGEEKPETERPETER", &alphabet).unwrap();
    let lookup = fwd.lookup(&w);
    assert_eq!(lookup.kind, LookupKind::Exact);
    assert_eq!(lookup.lower_classes, &[3]);
}

#[test]
fn purging_removes_entries_whose_only_rank_collided() {
    let alphabet = alpha();
    let seq = "NERDGEEKPETERPETER";
    let records = vec![rec("a", 1, seq), rec("b", 2, seq)];

    let (fwd, _rev, fwd_counts, _rev_counts) =
        build_ecurves(&alphabet, 1, true, &records, &mut NoProgress).unwrap();

    assert!(fwd.is_empty());
    assert!(fwd_counts.collisions > 0);
    assert_eq!(fwd_counts.purged, 1);
}

#[test]
fn reverse_ecurve_is_built_from_the_sequence_read_back_to_front() {
    let alphabet = alpha();
    let seq = "NERDGEEKPETERPETER";
    let records = vec![rec("a", 9, seq)];

    let (_fwd, rev, _fwd_counts, _rev_counts) =
        build_ecurves(&alphabet, 1, false, &records, &mut NoProgress).unwrap();

    let reversed: String = seq.chars().rev().collect();
    let w = Word::from_str(&reversed, &alphabet).unwrap();
    let lookup = rev.lookup(&w);
    assert_eq!(lookup.kind, LookupKind::Exact);
    assert_eq!(lookup.lower_classes, &[9]);
}
