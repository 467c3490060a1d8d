//! Web font wrapping for TrueType data.
//!
//! WOFF2 goes through `ttf2woff2` (Brotli, transformed glyf/loca). WOFF 1.0 is
//! written here, each table zlib-compressed when that makes it smaller.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use flate2::{Compression, write::ZlibEncoder};
use log::debug;
use read_fonts::{FontRef, TableProvider};
use ttf2woff2::BrotliQuality;

const WOFF_SIGNATURE: &[u8; 4] = b"wOFF";
const WOFF_HEADER_LEN: usize = 44;
const WOFF_DIR_ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_DIR_ENTRY_LEN: usize = 16;

/// Compress TrueType data to WOFF2.
pub fn to_woff2(data: &[u8]) -> Result<Vec<u8>> {
    let woff2 = ttf2woff2::encode(data, BrotliQuality::default())
        .map_err(|e| anyhow!("WOFF2 encoding failed: {e:?}"))?;
    debug!("WOFF2: {} -> {} bytes", data.len(), woff2.len());
    Ok(woff2)
}

/// Wrap TrueType data in a WOFF 1.0 container.
///
/// Tables keep their sfnt order and checksums. A table is stored compressed
/// only when zlib shrinks it. The WOFF version is taken from
/// `head.fontRevision` (6.400 gives major 6, minor 400).
pub fn to_woff(data: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let records = font.table_directory.table_records();
    let num_tables = records.len();

    let mut tables = Vec::with_capacity(num_tables);
    for record in records {
        let tag = record.tag();
        let table = font.table_data(tag).with_context(|| format!("Missing data for {tag}"))?;
        tables.push((tag, record.checksum(), table.as_bytes()));
    }

    let total_sfnt_size = SFNT_HEADER_LEN
        + SFNT_DIR_ENTRY_LEN * num_tables
        + tables.iter().map(|(_, _, t)| padded(t.len())).sum::<usize>();
    let (major, minor) = match font.head() {
        Ok(head) => version_parts(head.font_revision().to_f64()),
        Err(_) => (0, 0),
    };

    let directory_len = WOFF_DIR_ENTRY_LEN * num_tables;
    let mut offset = WOFF_HEADER_LEN + directory_len;
    let mut directory = Vec::with_capacity(directory_len);
    let mut body = Vec::new();
    for (tag, checksum, table) in &tables {
        let compressed = compress(table)?;
        let stored = match &compressed {
            Some(compressed) => compressed.as_slice(),
            None => table,
        };
        directory.extend_from_slice(&tag.to_be_bytes());
        directory.extend_from_slice(&u32_of(offset)?.to_be_bytes());
        directory.extend_from_slice(&u32_of(stored.len())?.to_be_bytes());
        directory.extend_from_slice(&u32_of(table.len())?.to_be_bytes());
        directory.extend_from_slice(&checksum.to_be_bytes());

        body.extend_from_slice(stored);
        body.resize(padded(body.len()), 0);
        offset = WOFF_HEADER_LEN + directory_len + body.len();
    }

    let length = WOFF_HEADER_LEN + directory.len() + body.len();
    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(WOFF_SIGNATURE);
    out.extend_from_slice(&font.table_directory.sfnt_version().to_be_bytes());
    out.extend_from_slice(&u32_of(length)?.to_be_bytes());
    out.extend_from_slice(&(num_tables as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&u32_of(total_sfnt_size)?.to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    // metadata and private blocks: none
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);

    debug!("WOFF: {} tables, {length} bytes", num_tables);
    Ok(out)
}

/// The zlib stream of `table`, if shorter than the table itself.
fn compress(table: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(table).context("Failed to compress table")?;
    let compressed = encoder.finish().context("Failed to compress table")?;
    Ok((compressed.len() < table.len()).then_some(compressed))
}

fn version_parts(revision: f64) -> (u16, u16) {
    let major = revision.trunc();
    let minor = ((revision - major) * 1000.0).round();
    (major.clamp(0.0, u16::MAX as f64) as u16, minor.clamp(0.0, u16::MAX as f64) as u16)
}

fn padded(len: usize) -> usize {
    (len + 3) & !3
}

fn u32_of(value: usize) -> Result<u32> {
    u32::try_from(value).context("Font too large for WOFF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded() {
        assert_eq!(padded(0), 0);
        assert_eq!(padded(1), 4);
        assert_eq!(padded(4), 4);
        assert_eq!(padded(5), 8);
    }

    #[test]
    fn test_compress_only_when_smaller() {
        assert!(compress(&[0u8; 1024]).unwrap().is_some_and(|c| c.len() < 1024));
        assert_eq!(compress(&[1, 2, 3]).unwrap(), None);
    }

    #[test]
    fn test_version_parts() {
        assert_eq!(version_parts(6.4), (6, 400));
        assert_eq!(version_parts(1.0), (1, 0));
    }
}
