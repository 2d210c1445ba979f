//! Staged-pair comparison.
//!
//! [`Comparator`] is chosen once per run. Both strategies report a file that
//! vanished before comparison as an error, never as a difference.

use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

use drift_core::ComparisonOutcome;

use crate::error::{compare_io_err, CompareError};

/// Read granularity of the strict comparator.
pub const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparator {
    /// Exact byte equality.
    #[default]
    Strict,
    /// Equality after dropping a carriage return that precedes a line feed
    /// or ends the file.
    IgnoreLineEndings,
}

impl Comparator {
    pub fn from_flag(ignore_line_endings: bool) -> Self {
        if ignore_line_endings {
            Comparator::IgnoreLineEndings
        } else {
            Comparator::Strict
        }
    }

    pub async fn compare(&self, a: &Path, b: &Path) -> ComparisonOutcome {
        match self.equal(a, b).await {
            Ok(true) => ComparisonOutcome::Identical,
            Ok(false) => ComparisonOutcome::Different,
            Err(err) => ComparisonOutcome::Error(err.to_string()),
        }
    }

    pub async fn equal(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        match self {
            Comparator::Strict => strict_equal(a, b).await,
            Comparator::IgnoreLineEndings => {
                let left = read(a).await?;
                let right = read(b).await?;
                Ok(strip_trailing_cr(&left) == strip_trailing_cr(&right))
            }
        }
    }
}

async fn strict_equal(a: &Path, b: &Path) -> Result<bool, CompareError> {
    let meta_a = tokio::fs::metadata(a)
        .await
        .map_err(|e| compare_io_err(a, e))?;
    let meta_b = tokio::fs::metadata(b)
        .await
        .map_err(|e| compare_io_err(b, e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut left = BufReader::new(open(a).await?);
    let mut right = BufReader::new(open(b).await?);
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];
    loop {
        let n_a = fill(&mut left, &mut buf_a)
            .await
            .map_err(|e| compare_io_err(a, e))?;
        let n_b = fill(&mut right, &mut buf_b)
            .await
            .map_err(|e| compare_io_err(b, e))?;
        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

async fn open(path: &Path) -> Result<tokio::fs::File, CompareError> {
    tokio::fs::File::open(path)
        .await
        .map_err(|e| compare_io_err(path, e))
}

async fn read(path: &Path) -> Result<Vec<u8>, CompareError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| compare_io_err(path, e))
}

/// Read until `buf` is full or EOF; returns the byte count.
async fn fill<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Drop each `\r` that sits right before `\n` or at the very end.
pub fn strip_trailing_cr(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for (idx, &byte) in bytes.iter().enumerate() {
        if byte == b'\r' && matches!(bytes.get(idx + 1), Some(b'\n') | None) {
            continue;
        }
        out.push(byte);
    }
    out
}
