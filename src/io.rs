use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("cannot open {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("IO")]
    Io(#[from] io::Error),
}

/// Open an uncompressed or a gzip-compressed file depending on the file name extension
fn xopen<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>, InputError> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin()));
    }
    let f = File::open(path).map_err(|source| InputError::Open {
        path: path.display().to_string(),
        source,
    })?;
    match path.extension() {
        Some(x) if x == "gz" => Ok(Box::new(MultiGzDecoder::new(f))),
        _ => Ok(Box::new(f)),
    }
}

/// Read a DNA sequence from a plain-text file (sequence characters and
/// whitespace only) or from a single-record FASTA file. The sequence is
/// uppercased.
pub fn read_sequence<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, InputError> {
    let mut reader = xopen(path)?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    Ok(parse_sequence(&data))
}

fn parse_sequence(data: &[u8]) -> Vec<u8> {
    let trimmed = data.trim_ascii();
    let lines: &[u8] = if trimmed.first() == Some(&b'>') {
        // FASTA: drop the header line, keep the remaining lines
        match trimmed.iter().position(|&c| c == b'\n') {
            Some(i) => &trimmed[i + 1..],
            None => &[],
        }
    } else {
        trimmed
    };
    lines
        .iter()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_sequence() {
        assert_eq!(parse_sequence(b"ACGT"), b"ACGT");
        assert_eq!(parse_sequence(b"  ACGT\n"), b"ACGT");
        assert_eq!(parse_sequence(b"acgt"), b"ACGT");
        assert_eq!(parse_sequence(b"AC\nGT\n"), b"ACGT");
        assert_eq!(parse_sequence(b""), b"");
    }

    #[test]
    fn test_parse_fasta_sequence() {
        assert_eq!(parse_sequence(b">chr1 comment\nAC\nGT\n"), b"ACGT");
        assert_eq!(parse_sequence(b">only-a-header"), b"");
    }

    #[test]
    fn test_read_sequence() {
        let tmp = temp_file::with_contents(b" ACGTacgt\n");
        let seq = read_sequence(tmp.path()).unwrap();
        assert_eq!(seq, b"ACGTACGT");
    }

    #[test]
    fn test_read_sequence_missing_file() {
        let result = read_sequence("does/not/exist.txt");
        assert!(matches!(result, Err(InputError::Open { .. })));
    }
}
