use uproc::alphabet::{Alphabet, ALPHABET_SIZE};

#[test]
fn every_amino_code_round_trips_through_a_custom_order() {
    let alpha = Alphabet::new("CDEFGHIKLMNPQRSTVWYA").unwrap();
    for code in 0..ALPHABET_SIZE as u8 {
        let c = alpha.amino_to_char(code).unwrap();
        assert_eq!(alpha.char_to_amino(c), Some(code));
    }
}

#[test]
fn unknown_letters_are_rejected_by_lookup_not_construction() {
    let alpha = Alphabet::new("AGSTPKRQEDNHYWFMLIVC").unwrap();
    assert_eq!(alpha.char_to_amino(b'*'), None);
    assert_eq!(alpha.char_to_amino(b'-'), None);
}

#[test]
fn construction_rejects_wrong_length_and_duplicates() {
    assert!(Alphabet::new("TOOSHORT").is_err());
    assert!(Alphabet::new("AAGSTPKRQEDNHYWFMLIV").is_err());
}
