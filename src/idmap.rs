// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Bidirectional mapping between class/family names and the small integer
//! codes the ecurve and classifiers operate on.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// A class/family code, the integer half of an [`IdMap`] entry.
pub type Family = u32;

/// Sentinel marking a rank slot as invalid: set by the database builder on
/// words whose class is ambiguous or filtered out at that rank, and skipped
/// by the classifier rather than looked up in an [`IdMap`].
pub const INVALID_FAMILY: Family = u32::MAX;

/// Append-only bidirectional name↔code map. Names are assigned codes in
/// the order they are first seen; looking up a name already present
/// returns its existing code rather than allocating a new one.
#[derive(Clone, Debug, Default)]
pub struct IdMap {
    names: Vec<String>,
    codes: HashMap<String, Family>,
}

impl IdMap {
    pub fn new() -> Self {
        IdMap::default()
    }

    /// The code for `name`, assigning a new one if it hasn't been seen.
    pub fn family(&mut self, name: &str) -> Family {
        if let Some(&f) = self.codes.get(name) {
            return f;
        }
        let f = self.names.len() as Family;
        self.names.push(name.to_string());
        self.codes.insert(name.to_string(), f);
        f
    }

    /// The name for `family`, if it has been assigned.
    pub fn name(&self, family: Family) -> Option<&str> {
        self.names.get(family as usize).map(String::as_str)
    }

    /// Number of distinct names in the map.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parse the `[n]` header followed by `n` names, one per line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .ok_or_else(|| Error::invalid_argument("empty idmap"))?
            .map_err(Error::Io)?;
        let n: usize = header
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::invalid_argument("invalid idmap header"))?;

        let mut map = IdMap::new();
        for i in 0..n {
            let line = lines
                .next()
                .ok_or_else(|| Error::invalid_argument("unexpected end of idmap"))?
                .map_err(Error::Io)?;
            let assigned = map.family(&line);
            if assigned as usize != i {
                return Err(Error::invalid_argument(format!(
                    "line {}: duplicate ID '{}'",
                    i + 2,
                    line
                )));
            }
        }
        Ok(map)
    }

    /// Serialize in the same `[n]`-header layout [`from_reader`] parses.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "[{}]", self.names.len()).map_err(Error::Io)?;
        for name in &self.names {
            writeln!(writer, "{}", name).map_err(Error::Io)?;
        }
        Ok(())
    }
}
