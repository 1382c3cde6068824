// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Positional amino-acid substitution matrices and suffix alignment.
//!
//! A [`SubstMat`] holds six 20×20 tables, one per position within a word's
//! 6-letter suffix, giving the similarity score between any two amino acids
//! at that position. Higher is more similar; totals may be negative.

use std::io::{BufRead, Write};

use ndarray::Array3;

use crate::alphabet::ALPHABET_SIZE;
use crate::error::{Error, Result};
use crate::word::{amino_at_pos, SUFFIX_LEN};

/// Six stacked 20×20 positional substitution matrices, indexed
/// `[position][amino_a][amino_b]`.
#[derive(Clone, Debug)]
pub struct SubstMat {
    tables: Array3<f64>,
}

impl SubstMat {
    /// Build a matrix from an already-populated `(SUFFIX_LEN, 20, 20)`
    /// array of scores.
    pub fn new(tables: Array3<f64>) -> Result<Self> {
        if tables.shape() != [SUFFIX_LEN, ALPHABET_SIZE, ALPHABET_SIZE] {
            return Err(Error::invalid_argument(format!(
                "substitution matrix must have shape ({}, {}, {}), got {:?}",
                SUFFIX_LEN,
                ALPHABET_SIZE,
                ALPHABET_SIZE,
                tables.shape()
            )));
        }
        Ok(SubstMat { tables })
    }

    /// Score for amino acids `a`/`b` at suffix position `pos` (`0..SUFFIX_LEN`,
    /// left to right within the suffix).
    pub fn get(&self, pos: usize, a: u8, b: u8) -> f64 {
        self.tables[[pos, a as usize, b as usize]]
    }

    /// Align the suffixes of two words, returning one score per suffix
    /// position.
    pub fn align_suffixes(&self, a: u32, b: u32) -> [f64; SUFFIX_LEN] {
        let mut d = [0.0; SUFFIX_LEN];
        for (pos, slot) in d.iter_mut().enumerate() {
            let amino_a = amino_at_pos(a, pos);
            let amino_b = amino_at_pos(b, pos);
            *slot = self.get(pos, amino_a, amino_b);
        }
        d
    }

    /// Parse six successive 20×20 decimal matrices from `reader`: whitespace
    /// separated floats, row-major, one matrix after another with no
    /// separators required beyond whitespace.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(Error::Io)?;
        let mut values = text.split_whitespace();
        let mut tables = Array3::<f64>::zeros((SUFFIX_LEN, ALPHABET_SIZE, ALPHABET_SIZE));
        for pos in 0..SUFFIX_LEN {
            for i in 0..ALPHABET_SIZE {
                for j in 0..ALPHABET_SIZE {
                    let tok = values.next().ok_or_else(|| {
                        Error::invalid_argument("substitution matrix file truncated")
                    })?;
                    let v: f64 = tok.parse().map_err(|_| {
                        Error::invalid_argument(format!("invalid substitution score '{}'", tok))
                    })?;
                    tables[[pos, i, j]] = v;
                }
            }
        }
        SubstMat::new(tables)
    }

    /// Serialize in the same layout [`from_reader`] parses. The format
    /// carries no alphabet of its own, matching [`from_reader`]: the score
    /// table is positional (by suffix offset and amino-acid code), and
    /// interpreting those codes against an alphabet is the caller's job,
    /// same as it is for [`from_reader`]'s output.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        for pos in 0..SUFFIX_LEN {
            for i in 0..ALPHABET_SIZE {
                let row: Vec<String> = (0..ALPHABET_SIZE)
                    .map(|j| self.get(pos, i as u8, j as u8).to_string())
                    .collect();
                writeln!(writer, "{}", row.join(" ")).map_err(Error::Io)?;
            }
        }
        Ok(())
    }
}
