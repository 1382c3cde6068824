// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Monte-Carlo score-threshold calibration.
//!
//! Draws random amino-acid sequences at several lengths from an empirical
//! amino-probability distribution, classifies each with [`Mode::All`], and
//! takes the 1%- and 0.1%-quantiles of the score distribution as threshold
//! anchors. A natural cubic spline interpolates between anchors to produce
//! a lookup table covering every sequence length from 20 to 5000.

use std::io::{BufRead, Write};

use rand::Rng;

use crate::alphabet::{Alphabet, ALPHABET_SIZE};
use crate::classifier::protein::ProteinClassifier;
use crate::classifier::Mode;
use crate::error::{Error, Result};

/// Sequence-length powers of two sampled during calibration: 2^5 .. 2^11,
/// i.e. 32 .. 2048.
const POW_MIN: u32 = 5;
const POW_MAX: u32 = 11;
const POW_DIFF: usize = (POW_MAX - POW_MIN) as usize;

/// Shortest and longest sequence length the interpolated table covers.
const INTERP_MIN: usize = 20;
const INTERP_MAX: usize = 5000;

/// Baseline sample count for the longest sampled length; shorter lengths
/// draw proportionally more sequences so the tail quantiles stay stable.
const SEQ_COUNT_MULTIPLIER: u64 = 200_000;

/// Quantile used for the looser of the two threshold tables (`e2`).
const QUANTILE_LOOSE: f64 = 0.01;
/// Quantile used for the stricter threshold table (`e3`).
const QUANTILE_STRICT: f64 = 0.001;

/// Tunable calibration parameters, broken out of the constants below so
/// callers can shrink them for tests instead of sampling at full scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationConfig {
    pub pow_min: u32,
    pub pow_max: u32,
    pub seq_count_multiplier: u64,
    pub quantile_loose: f64,
    pub quantile_strict: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            pow_min: POW_MIN,
            pow_max: POW_MAX,
            seq_count_multiplier: SEQ_COUNT_MULTIPLIER,
            quantile_loose: QUANTILE_LOOSE,
            quantile_strict: QUANTILE_STRICT,
        }
    }
}

/// A length-indexed score threshold table, interpolated over
/// `[INTERP_MIN, INTERP_MAX)` and persisted as `INTERP_MAX` whitespace
/// separated floats.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdTable {
    values: Vec<f64>,
}

impl ThresholdTable {
    /// The calibrated score threshold for a sequence of length `len`;
    /// lengths beyond the table's range reuse its last entry.
    pub fn threshold_for(&self, len: usize) -> f64 {
        let index = len.clamp(1, self.values.len()) - 1;
        self.values[index]
    }

    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        std::io::Read::read_to_string(&mut reader, &mut text).map_err(Error::Io)?;
        let values: std::result::Result<Vec<f64>, _> =
            text.split_whitespace().map(str::parse::<f64>).collect();
        let values = values
            .map_err(|_| Error::invalid_argument("invalid threshold table entry"))?;
        if values.len() != INTERP_MAX {
            return Err(Error::invalid_argument(format!(
                "threshold table must have {} entries, got {}",
                INTERP_MAX,
                values.len()
            )));
        }
        Ok(ThresholdTable { values })
    }

    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let row: Vec<String> = self.values.iter().map(f64::to_string).collect();
        writeln!(writer, "{}", row.join(" ")).map_err(Error::Io)
    }
}

/// Pick a random amino acid from `probs` (or uniformly if `None`), mirroring
/// the cumulative-sum `choice` routine of the original calibration tool.
fn choice(rng: &mut impl Rng, probs: Option<&[f64]>) -> u8 {
    let c: f64 = rng.gen();
    let mut sum = 0.0;
    for i in 0..ALPHABET_SIZE {
        sum += match probs {
            Some(p) => p[i],
            None => 1.0 / ALPHABET_SIZE as f64,
        };
        if sum >= c {
            return i as u8;
        }
    }
    (ALPHABET_SIZE - 1) as u8
}

fn randseq(rng: &mut impl Rng, len: usize, alphabet: &Alphabet, probs: &[f64]) -> String {
    (0..len)
        .map(|_| {
            let amino = choice(rng, Some(probs));
            alphabet.amino_to_char(amino).expect("amino in range") as char
        })
        .collect()
}

/// Natural cubic spline interpolation: fit `(xa, ya)` knots, then evaluate
/// at every point in `x`, writing results into `y`.
///
/// Direct translation of the tridiagonal second-derivative solve used
/// throughout the original codebase's `csinterp`.
fn csinterp(xa: &[f64], ya: &[f64], x: &[f64], y: &mut [f64]) -> Result<()> {
    let m = xa.len();
    let mut u = vec![0.0; m];
    let mut ya2 = vec![0.0; m];

    for i in 1..m - 1 {
        let a = (xa[i] - xa[i - 1]) / (xa[i + 1] - xa[i - 1]);
        let b = a * ya2[i - 1] + 2.0;
        ya2[i] = (a - 1.0) / b;
        let mut ui = (ya[i + 1] - ya[i]) / (xa[i + 1] - xa[i])
            - (ya[i] - ya[i - 1]) / (xa[i] - xa[i - 1]);
        ui = (6.0 * ui / (xa[i + 1] - xa[i - 1]) - a * u[i - 1]) / b;
        u[i] = ui;
    }

    for i in (1..m).rev() {
        ya2[i - 1] = ya2[i - 1] * ya2[i] + u[i - 1];
    }

    let mut low = 0usize;
    let mut high = m - 1;
    for (i, &xi) in x.iter().enumerate() {
        if i > 0 && (xa[low] > xi || xa[high] < xi) {
            low = 0;
            high = m - 1;
        }
        while high - low > 1 {
            let mid = (high + low) / 2;
            if xa[mid] > xi {
                high = mid;
            } else {
                low = mid;
            }
        }
        let h = xa[high] - xa[low];
        if h == 0.0 {
            return Err(Error::invalid_argument("csinterp: duplicate knot"));
        }
        let a = (xa[high] - xi) / h;
        let b = (xi - xa[low]) / h;
        y[i] = a * ya[low]
            + b * ya[high]
            + ((a * a * a - a) * ya2[low] + (b * b * b - b) * ya2[high]) * (h * h) / 6.0;
    }
    Ok(())
}

fn store_interpolated(thresh: &[f64], pow_min: u32) -> Result<ThresholdTable> {
    let m = thresh.len();
    let xa: Vec<f64> = (0..m).map(|i| i as f64).collect();
    let x: Vec<f64> = (0..INTERP_MAX)
        .map(|i| {
            let xi = if i < INTERP_MIN { INTERP_MIN as f64 } else { i as f64 };
            xi.log2() - pow_min as f64
        })
        .collect();
    let mut y = vec![0.0; INTERP_MAX];
    csinterp(&xa, thresh, &x, &mut y)?;
    Ok(ThresholdTable { values: y })
}

fn quantile_score(mut scores: Vec<f64>, quantile: f64) -> f64 {
    scores.sort_by(|a, b| b.partial_cmp(a).expect("scores are never NaN"));
    if scores.is_empty() {
        return 0.0;
    }
    let index = ((scores.len() as f64 * quantile) as usize).min(scores.len() - 1);
    scores[index]
}

/// Run Monte-Carlo calibration against `protein`, returning the `e2`
/// (1% quantile) and `e3` (0.1% quantile) threshold tables.
pub fn calibrate(
    protein: &ProteinClassifier<'_>,
    alphabet: &Alphabet,
    aa_probs: &[f64],
    config: &CalibrationConfig,
    rng: &mut impl Rng,
) -> Result<(ThresholdTable, ThresholdTable)> {
    if aa_probs.len() != ALPHABET_SIZE {
        return Err(Error::invalid_argument("aa_probs must have 20 entries"));
    }
    let pow_diff = (config.pow_max - config.pow_min) as usize;
    let mut thresh_loose = vec![0.0; pow_diff + 1];
    let mut thresh_strict = vec![0.0; pow_diff + 1];

    for power in config.pow_min..=config.pow_max {
        let seq_len = 1usize << power;
        let seq_count = (1u64 << (config.pow_max - power)) * config.seq_count_multiplier;

        let mut scores = Vec::new();
        for _ in 0..seq_count {
            let seq = randseq(rng, seq_len, alphabet, aa_probs);
            let results = protein.classify(&seq, |_, _, _, score| score > f64::EPSILON);
            scores.extend(results.into_iter().map(|r| r.score));
        }

        let slot = (power - config.pow_min) as usize;
        thresh_loose[slot] = quantile_score(scores.clone(), config.quantile_loose);
        thresh_strict[slot] = quantile_score(scores, config.quantile_strict);
    }

    let e2 = store_interpolated(&thresh_loose, config.pow_min)?;
    let e3 = store_interpolated(&thresh_strict, config.pow_min)?;
    Ok((e2, e3))
}
