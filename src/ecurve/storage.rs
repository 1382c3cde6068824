// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Binary (mmap-friendly) and plain-text serialization of an [`Ecurve`].
//!
//! The binary layout mirrors `libuproc/ecurve_mmap.c`'s header/magic-number
//! framing, with the dense `(20^12+1)`-entry prefix table replaced by a
//! sparse list of populated `(prefix, first, count)` triples (see
//! [`crate::ecurve`] module docs). The plain-text layout mirrors
//! `libuproc/ecurve_storage.c`'s `load_plain`/`store_plain`, which was
//! already sparse (only populated prefixes get a section).

use std::fs::File;
use std::io::{BufRead, Read, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::alphabet::{Alphabet, ALPHABET_SIZE};
use crate::error::{Error, Result};
use crate::idmap::Family;
use crate::word::Word;

use super::{Ecurve, EcurveBuilder};

const MAGIC: u64 = 0xd2eadf;

fn prefix_str(prefix: u64, alphabet: &Alphabet) -> Result<String> {
    let w = Word { prefix, suffix: 0 };
    Ok(w.to_string(alphabet)?[..crate::word::PREFIX_LEN].to_string())
}

fn suffix_str(suffix: u32, alphabet: &Alphabet) -> Result<String> {
    let w = Word { prefix: 0, suffix };
    Ok(w.to_string(alphabet)?[crate::word::PREFIX_LEN..].to_string())
}

fn parse_prefix(s: &str, alphabet: &Alphabet) -> Result<u64> {
    let mut padded = s.to_string();
    for _ in 0..crate::word::SUFFIX_LEN {
        padded.push(alphabet.amino_to_char(0).expect("alphabet always maps code 0") as char);
    }
    Ok(Word::from_str(&padded, alphabet)?.prefix)
}

fn parse_suffix(s: &str, alphabet: &Alphabet) -> Result<u32> {
    let mut padded = String::new();
    for _ in 0..crate::word::PREFIX_LEN {
        padded.push(alphabet.amino_to_char(0).expect("alphabet always maps code 0") as char);
    }
    padded.push_str(s);
    Ok(Word::from_str(&padded, alphabet)?.suffix)
}

/// Serialize `ecurve` to the plain-text format: a header line followed by
/// one section per populated prefix.
pub fn store_plain<W: Write>(ecurve: &Ecurve, mut writer: W) -> Result<()> {
    writeln!(
        writer,
        ">> alphabet: {}, ranks: {}, suffixes: {}",
        ecurve.alphabet.as_str(),
        ecurve.ranks_count,
        ecurve.suffix_count()
    )
    .map_err(Error::Io)?;

    for (&prefix, range) in &ecurve.prefixes {
        writeln!(
            writer,
            ">{} {}",
            prefix_str(prefix, &ecurve.alphabet)?,
            range.count
        )
        .map_err(Error::Io)?;

        let first = range.first as usize;
        let count = range.count as usize;
        for i in first..first + count {
            let classes = ecurve.classes_at(i as u64);
            let class_strs: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
            writeln!(
                writer,
                "{} {}",
                suffix_str(ecurve.suffixes[i], &ecurve.alphabet)?,
                class_strs.join(",")
            )
            .map_err(Error::Io)?;
        }
    }
    Ok(())
}

fn parse_header(line: &str) -> Result<(String, usize, usize)> {
    let rest = line
        .strip_prefix(">> alphabet: ")
        .ok_or_else(|| Error::invalid_argument("invalid ecurve header"))?;
    let (alpha, rest) = rest
        .split_once(", ranks: ")
        .ok_or_else(|| Error::invalid_argument("invalid ecurve header"))?;
    let (ranks, suffixes) = rest
        .split_once(", suffixes: ")
        .ok_or_else(|| Error::invalid_argument("invalid ecurve header"))?;
    let ranks_count: usize = ranks
        .parse()
        .map_err(|_| Error::invalid_argument("invalid ranks count"))?;
    let suffix_count: usize = suffixes
        .trim_end()
        .parse()
        .map_err(|_| Error::invalid_argument("invalid suffix count"))?;
    Ok((alpha.to_string(), ranks_count, suffix_count))
}

/// Parse the plain-text format written by [`store_plain`].
pub fn load_plain<R: BufRead>(reader: R) -> Result<Ecurve> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .ok_or_else(|| Error::invalid_argument("empty ecurve file"))?
        .map_err(Error::Io)?;
    let (alpha_str, ranks_count, suffix_count) = parse_header(&header)?;
    let alphabet = Alphabet::new(&alpha_str)?;

    let mut builder = EcurveBuilder::create(alphabet.clone(), ranks_count)?;
    let mut seen = 0usize;
    while seen < suffix_count {
        let prefix_line = lines
            .next()
            .ok_or_else(|| Error::invalid_argument("unexpected end of ecurve file"))?
            .map_err(Error::Io)?;
        let (prefix_part, count_part) = prefix_line
            .strip_prefix('>')
            .and_then(|s| s.rsplit_once(' '))
            .ok_or_else(|| Error::invalid_argument("invalid prefix line"))?;
        let prefix = parse_prefix(prefix_part, &alphabet)?;
        let count: usize = count_part
            .parse()
            .map_err(|_| Error::invalid_argument("invalid suffix count in prefix line"))?;

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let line = lines
                .next()
                .ok_or_else(|| Error::invalid_argument("unexpected end of ecurve file"))?
                .map_err(Error::Io)?;
            let (suffix_part, classes_part) = line
                .rsplit_once(' ')
                .ok_or_else(|| Error::invalid_argument("invalid suffix line"))?;
            let suffix = parse_suffix(suffix_part, &alphabet)?;
            let classes: Vec<Family> = classes_part
                .split(',')
                .map(|c| c.parse().map_err(|_| Error::invalid_argument("invalid class id")))
                .collect::<std::result::Result<_, _>>()?;
            entries.push((suffix, classes));
        }
        builder.add_prefix(prefix, &entries)?;
        seen += count;
    }
    builder.finalize()
}

/// Serialize `ecurve` to the binary layout, writing raw host-endian bytes.
pub fn store_binary<W: Write>(ecurve: &Ecurve, mut writer: W) -> Result<()> {
    let mut alpha_bytes = [0u8; ALPHABET_SIZE];
    alpha_bytes.copy_from_slice(ecurve.alphabet.as_str().as_bytes());
    writer.write_all(&alpha_bytes).map_err(Error::Io)?;
    writer
        .write_all(&(ecurve.ranks_count as u64).to_ne_bytes())
        .map_err(Error::Io)?;
    writer
        .write_all(&(ecurve.suffix_count() as u64).to_ne_bytes())
        .map_err(Error::Io)?;

    writer
        .write_all(&(ecurve.prefixes.len() as u64).to_ne_bytes())
        .map_err(Error::Io)?;
    for (&prefix, range) in &ecurve.prefixes {
        writer.write_all(&prefix.to_ne_bytes()).map_err(Error::Io)?;
        writer.write_all(&range.first.to_ne_bytes()).map_err(Error::Io)?;
        writer
            .write_all(&range.count.to_ne_bytes())
            .map_err(Error::Io)?;
    }
    writer.write_all(&MAGIC.to_ne_bytes()).map_err(Error::Io)?;

    for &suffix in &ecurve.suffixes {
        writer.write_all(&suffix.to_ne_bytes()).map_err(Error::Io)?;
    }
    writer.write_all(&MAGIC.to_ne_bytes()).map_err(Error::Io)?;

    for &class in &ecurve.classes {
        writer.write_all(&class.to_ne_bytes()).map_err(Error::Io)?;
    }
    writer.write_all(&MAGIC.to_ne_bytes()).map_err(Error::Io)?;
    Ok(())
}

/// Write `ecurve` to `path` in the binary layout.
pub fn store_binary_to_path(ecurve: &Ecurve, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    store_binary(ecurve, file)
}

struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    path: &'a Path,
}

impl<'a> ByteCursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(Error::format(self.path, "truncated ecurve file"));
        }
        let s = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn take_u64(&mut self) -> Result<u64> {
        Ok(u64::from_ne_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn take_u32(&mut self) -> Result<u32> {
        Ok(u32::from_ne_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn expect_magic(&mut self, which: &str) -> Result<()> {
        if self.take_u64()? != MAGIC {
            return Err(Error::format(self.path, format!("bad magic number ({})", which)));
        }
        Ok(())
    }
}

fn parse_binary(data: &[u8], path: &Path) -> Result<Ecurve> {
    let mut cur = ByteCursor { data, pos: 0, path };

    let alpha_bytes = cur.take(ALPHABET_SIZE)?;
    let alpha_str = std::str::from_utf8(alpha_bytes)
        .map_err(|_| Error::format(path, "alphabet is not valid UTF-8"))?;
    let alphabet = Alphabet::new(alpha_str)?;

    let ranks_count = cur.take_u64()? as usize;
    let suffix_count = cur.take_u64()? as usize;
    let populated_count = cur.take_u64()? as usize;

    let mut triples = Vec::with_capacity(populated_count);
    for _ in 0..populated_count {
        let prefix = cur.take_u64()?;
        let first = cur.take_u64()?;
        let count = cur.take_u32()?;
        triples.push((prefix, first, count));
    }
    cur.expect_magic("after prefixes")?;

    let mut suffixes = Vec::with_capacity(suffix_count);
    for _ in 0..suffix_count {
        suffixes.push(cur.take_u32()?);
    }
    cur.expect_magic("after suffixes")?;

    let mut classes = Vec::with_capacity(suffix_count * ranks_count);
    for _ in 0..suffix_count * ranks_count {
        classes.push(cur.take_u32()?);
    }
    cur.expect_magic("after classes")?;

    let mut builder = EcurveBuilder::create(alphabet, ranks_count)?;
    for (prefix, first, count) in triples {
        let first = first as usize;
        let count = count as usize;
        let mut entries = Vec::with_capacity(count);
        for i in first..first + count {
            let row = &classes[i * ranks_count..(i + 1) * ranks_count];
            entries.push((suffixes[i], row.to_vec()));
        }
        builder.add_prefix(prefix, &entries)?;
    }
    builder.finalize()
}

/// Read the binary layout from an ordinary (non-mmap) reader.
pub fn load_binary<R: Read>(mut reader: R, path: impl AsRef<Path>) -> Result<Ecurve> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(Error::Io)?;
    parse_binary(&buf, path.as_ref())
}

/// Memory-map `path` and parse it as the binary layout.
///
/// The backing `Mmap` is dropped once parsing has copied the ecurve's data
/// into owned `Vec`s: true zero-copy-forever borrowing would require
/// `Ecurve` to carry the mapping's lifetime, which none of its callers
/// need given how small a built database's suffix/class arrays are next to
/// a genome-scale reference sequence.
pub fn load_mmap(path: impl AsRef<Path>) -> Result<Ecurve> {
    let path = path.as_ref();
    let file = File::open(path).map_err(Error::Io)?;
    let mmap = unsafe { Mmap::map(&file).map_err(Error::Io)? };
    parse_binary(&mmap, path)
}
