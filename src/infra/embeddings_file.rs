// ============================================================
// Layer 6 — Pretrained Embedding Files
// ============================================================
// Reads the large pretrained word-vector files (several GB for
// the full word2vec / GloVe releases) and keeps only the words
// the corpus actually uses.
//
// Supported formats:
//
//   glove         "word 0.1 0.2 …"          one vector per line,
//                                             split at the first space
//   word2vec      "N D" header, then         same as glove but split on
//                 "word 0.1 0.2 …"           any whitespace; the header
//                                             is recognised by having 2 fields
//   word2vec-bin  "N D\n" header, then per   original C binary release;
//                 word: "word " + D × f32 LE  no text conversion needed
//
// Any of them may be gzipped (file name ending in "gz").

use anyhow::{bail, ensure, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::{BufRead, Write},
    path::Path,
    str::FromStr,
};

use crate::domain::vocabulary::WordVectors;
use crate::infra::io::{create_writer, open_reader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingsFormat {
    Glove,
    Word2vec,
    Word2vecBin,
}

impl fmt::Display for EmbeddingsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Glove       => "glove",
            Self::Word2vec    => "word2vec",
            Self::Word2vecBin => "word2vec-bin",
        };
        f.write_str(name)
    }
}

impl FromStr for EmbeddingsFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "glove"        => Ok(Self::Glove),
            "word2vec"     => Ok(Self::Word2vec),
            "word2vec-bin" => Ok(Self::Word2vecBin),
            other => bail!(
                "Unknown embeddings file type '{}'; must be \"glove\", \"word2vec\" or \"word2vec-bin\"",
                other
            ),
        }
    }
}

// ─── Line parsers ────────────────────────────────────────────────────────────

fn parse_floats(values: &str) -> Result<Vec<f32>> {
    values
        .split_whitespace()
        .map(|v| v.parse::<f32>().with_context(|| format!("bad vector component '{v}'")))
        .collect()
}

/// "word v1 v2 …" split at the first space.
pub fn parse_glove_line(line: &str) -> Result<Option<(String, Vec<f32>)>> {
    let line = line.trim_end();
    match line.split_once(' ') {
        Some((word, rest)) if !word.is_empty() => Ok(Some((word.to_string(), parse_floats(rest)?))),
        _ => Ok(None),
    }
}

/// "word v1 v2 …" split on whitespace; "N D" header lines yield None.
pub fn parse_word2vec_line(line: &str) -> Result<Option<(String, Vec<f32>)>> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();
    if rest.len() <= 1 {
        return Ok(None);
    }
    let vector = rest
        .iter()
        .map(|v| v.parse::<f32>().with_context(|| format!("bad vector component '{v}'")))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some((word.to_string(), vector)))
}

// ─── Binary word2vec ─────────────────────────────────────────────────────────

/// Parse the "count dimension" header line.
fn read_word2vec_header<R: BufRead>(reader: &mut R) -> Result<(usize, usize)> {
    let mut header = String::new();
    reader.read_line(&mut header).context("Cannot read word2vec header")?;
    let dims: Vec<usize> = header
        .split_whitespace()
        .map(|v| v.parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("bad word2vec header '{}'", header.trim()))?;
    ensure!(dims.len() == 2, "word2vec header must be 'count dimension', found '{}'", header.trim());
    Ok((dims[0], dims[1]))
}

/// Walk the `count` (word, vector) pairs that follow the header.
fn read_word2vec_entries<R: BufRead>(
    mut reader: R,
    count:      usize,
    dimension:  usize,
    mut visit:  impl FnMut(String, Vec<f32>) -> Result<()>,
) -> Result<()> {
    let mut word_buf = Vec::new();
    let mut vec_buf  = vec![0u8; dimension * 4];

    for n in 0..count {
        word_buf.clear();
        reader.read_until(b' ', &mut word_buf)?;
        ensure!(word_buf.last() == Some(&b' '), "word2vec file ends early at entry {}", n);
        word_buf.pop();
        let word = String::from_utf8_lossy(&word_buf).trim_start_matches('\n').to_string();

        reader
            .read_exact(&mut vec_buf)
            .with_context(|| format!("word2vec file ends inside the vector of '{word}'"))?;
        let vector = vec_buf
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        visit(word, vector)?;
    }

    Ok(())
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Return the vectors of every word accepted by `wanted`.
/// Words absent from the embeddings file are simply not in the result.
pub fn extract_vectors<F>(path: &Path, format: EmbeddingsFormat, wanted: F) -> Result<WordVectors>
where
    F: Fn(&str) -> bool,
{
    tracing::info!("Reading {} embeddings from '{}'", format, path.display());
    let mut reader = open_reader(path)?;
    let mut found  = WordVectors::new();

    if format == EmbeddingsFormat::Word2vecBin {
        let (count, dimension) = read_word2vec_header(&mut reader)?;
        read_word2vec_entries(reader, count, dimension, |word, vector| {
            if wanted(&word) {
                found.insert(word, vector);
            }
            Ok(())
        })?;
        return Ok(found);
    }

    let mut line = String::new();
    let mut n    = 0usize;
    loop {
        line.clear();
        if reader.read_line(&mut line).with_context(|| format!("Cannot read '{}'", path.display()))? == 0 {
            break;
        }
        n += 1;

        // Cheap check on the head before parsing hundreds of floats
        let head = match format {
            EmbeddingsFormat::Glove => line.split(' ').next(),
            _                       => line.split_whitespace().next(),
        };
        if !head.map(&wanted).unwrap_or(false) {
            continue;
        }

        let parsed = match format {
            EmbeddingsFormat::Glove => parse_glove_line(&line),
            _                       => parse_word2vec_line(&line),
        }
        .with_context(|| format!("{}:{}", path.display(), n))?;

        if let Some((word, vector)) = parsed {
            found.insert(word, vector);
        }
    }

    Ok(found)
}

/// Rewrite a binary word2vec file in the word2vec text format.
/// Entries are written as they are read, one at a time.
pub fn convert_word2vec_binary(input: &Path, output: &Path) -> Result<usize> {
    let mut reader = open_reader(input)?;
    let mut writer = create_writer(output)?;

    let (count, dimension) = read_word2vec_header(&mut reader)?;
    writeln!(writer, "{} {}", count, dimension)?;

    read_word2vec_entries(reader, count, dimension, |word, vector| {
        write!(writer, "{}", word)?;
        for v in &vector {
            write!(writer, " {}", v)?;
        }
        writeln!(writer)?;
        Ok(())
    })?;
    writer.flush().with_context(|| format!("Cannot write '{}'", output.display()))?;

    tracing::info!("Converted {} vectors of dimension {} to '{}'", count, dimension, output.display());
    Ok(count)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Read;

    fn write_binary(path: &Path, entries: &[(&str, [f32; 3])]) {
        let mut bytes = format!("{} 3\n", entries.len()).into_bytes();
        for (word, vector) in entries {
            bytes.extend_from_slice(word.as_bytes());
            bytes.push(b' ');
            for v in vector {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            bytes.push(b'\n');
        }
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_glove_line() {
        let (w, v) = parse_glove_line("house 0.5 -1 2e-1\n").unwrap().unwrap();
        assert_eq!(w, "house");
        assert_eq!(v, vec![0.5, -1.0, 0.2]);
    }

    #[test]
    fn test_word2vec_header_is_skipped() {
        assert!(parse_word2vec_line("3000000 300").unwrap().is_none());
        let (w, v) = parse_word2vec_line("dog 1.0 2.0").unwrap().unwrap();
        assert_eq!(w, "dog");
        assert_eq!(v, vec![1.0, 2.0]);
    }

    #[test]
    fn test_bad_component_is_an_error() {
        assert!(parse_glove_line("cat 0.1 oops").is_err());
    }

    #[test]
    fn test_unknown_format_name() {
        assert_eq!("glove".parse::<EmbeddingsFormat>().unwrap(), EmbeddingsFormat::Glove);
        let err = "fasttext".parse::<EmbeddingsFormat>().unwrap_err();
        assert!(err.to_string().contains("Unknown embeddings file type"));
    }

    #[test]
    fn test_extract_keeps_only_wanted_words_from_gzipped_glove() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("glove.txt.gz");
        {
            let mut w = create_writer(&path).unwrap();
            writeln!(w, "the 0.1 0.2").unwrap();
            writeln!(w, "warrant 0.3 0.4").unwrap();
            writeln!(w, "zebra 0.5 0.6").unwrap();
            w.flush().unwrap();
        }

        let wanted: HashSet<&str> = ["the", "warrant", "missing"].into_iter().collect();
        let found = extract_vectors(&path, EmbeddingsFormat::Glove, |w| wanted.contains(w)).unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found["warrant"], vec![0.3, 0.4]);
        assert!(!found.contains_key("zebra"));
    }

    #[test]
    fn test_binary_file_and_its_text_conversion_agree() {
        let dir  = tempfile::tempdir().unwrap();
        let bin  = dir.path().join("vectors.bin");
        let txt  = dir.path().join("vectors.txt");
        write_binary(&bin, &[("claim", [0.25, -0.5, 1.0]), ("reason", [2.0, 0.0, -0.125])]);

        let from_bin = extract_vectors(&bin, EmbeddingsFormat::Word2vecBin, |_| true).unwrap();
        assert_eq!(from_bin["claim"], vec![0.25, -0.5, 1.0]);

        assert_eq!(convert_word2vec_binary(&bin, &txt).unwrap(), 2);
        let from_txt = extract_vectors(&txt, EmbeddingsFormat::Word2vec, |_| true).unwrap();
        assert_eq!(from_bin, from_txt);
    }

    #[test]
    fn test_converted_header_matches_the_binary_header() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("vectors.bin");
        let txt = dir.path().join("vectors.txt.gz");
        write_binary(&bin, &[("a", [1.0, 2.0, 3.0]), ("b", [0.0, 0.0, 0.0]), ("c", [-1.0, 0.5, 4.0])]);

        convert_word2vec_binary(&bin, &txt).unwrap();

        let mut text = String::new();
        open_reader(&txt).unwrap().read_to_string(&mut text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "3 3");
        assert_eq!(lines.len(), 1 + 3);
        assert_eq!(lines[3], "c -1 0.5 4");
    }

    #[test]
    fn test_truncated_binary_file_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        std::fs::write(&path, b"2 3\nonly ").unwrap();
        assert!(extract_vectors(&path, EmbeddingsFormat::Word2vecBin, |_| true).is_err());
    }
}
