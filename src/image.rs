//! image - checkpoint image of all relations (<root>/tables.img).
//!
//! Layout (LE):
//! [magic8="BKSTIMG1"][version u32][reserved u32][lsn u64][payload_len u64][crc32c u32] + payload
//!
//! CRC32C covers header[0..crc) + payload. The image is replaced atomically
//! (tmp+rename); `lsn` is the last WAL record already folded into it.

use anyhow::{anyhow, bail, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{decode_tables, encode_tables};
use crate::consts::{IMAGE_FILE, IMAGE_HDR_SIZE, IMAGE_MAGIC, IMAGE_VERSION};
use crate::tables::Tables;
use crate::util::write_atomic;

const OFF_VERSION: usize = 8;
const OFF_RESERVED: usize = 12;
const OFF_LSN: usize = 16;
const OFF_LEN: usize = 24;
const OFF_CRC: usize = 32;

#[inline]
pub fn image_path(root: &Path) -> PathBuf {
    root.join(IMAGE_FILE)
}

/// Записать образ таблиц с данным LSN.
pub fn write_image(root: &Path, tables: &Tables, lsn: u64) -> Result<()> {
    let payload = encode_tables(tables)?;

    let mut buf = vec![0u8; IMAGE_HDR_SIZE];
    buf[..8].copy_from_slice(IMAGE_MAGIC);
    LittleEndian::write_u32(&mut buf[OFF_VERSION..OFF_VERSION + 4], IMAGE_VERSION);
    LittleEndian::write_u32(&mut buf[OFF_RESERVED..OFF_RESERVED + 4], 0);
    LittleEndian::write_u64(&mut buf[OFF_LSN..OFF_LSN + 8], lsn);
    LittleEndian::write_u64(&mut buf[OFF_LEN..OFF_LEN + 8], payload.len() as u64);
    let crc = crc32c::crc32c_append(crc32c::crc32c(&buf[..OFF_CRC]), &payload);
    LittleEndian::write_u32(&mut buf[OFF_CRC..OFF_CRC + 4], crc);
    buf.extend_from_slice(&payload);

    let path = image_path(root);
    write_atomic(&path, &buf)?;
    debug!(
        "image: wrote {} ({} B, lsn={})",
        path.display(),
        buf.len(),
        lsn
    );
    Ok(())
}

/// Прочитать образ: (таблицы, lsn). Любое несоответствие - ошибка (образ
/// пишется атомарно, поэтому порча здесь не «нормальный хвост», как в WAL).
pub fn read_image(root: &Path) -> Result<(Tables, u64)> {
    let path = image_path(root);
    let bytes = fs::read(&path).with_context(|| format!("read image {}", path.display()))?;
    if bytes.len() < IMAGE_HDR_SIZE {
        bail!("image {} too small ({} B)", path.display(), bytes.len());
    }
    if &bytes[..8] != IMAGE_MAGIC {
        bail!("bad image magic in {}", path.display());
    }
    let version = LittleEndian::read_u32(&bytes[OFF_VERSION..OFF_VERSION + 4]);
    if version != IMAGE_VERSION {
        bail!(
            "unsupported image version {} in {} (expected {})",
            version,
            path.display(),
            IMAGE_VERSION
        );
    }
    let lsn = LittleEndian::read_u64(&bytes[OFF_LSN..OFF_LSN + 8]);
    let len = LittleEndian::read_u64(&bytes[OFF_LEN..OFF_LEN + 8]);
    let crc_expected = LittleEndian::read_u32(&bytes[OFF_CRC..OFF_CRC + 4]);

    let payload = &bytes[IMAGE_HDR_SIZE..];
    if payload.len() as u64 != len {
        bail!(
            "image {} payload length mismatch: header {} vs actual {}",
            path.display(),
            len,
            payload.len()
        );
    }
    let crc_actual = crc32c::crc32c_append(crc32c::crc32c(&bytes[..OFF_CRC]), payload);
    if crc_actual != crc_expected {
        return Err(anyhow!(
            "image {} checksum mismatch (expected {:08x}, got {:08x})",
            path.display(),
            crc_expected,
            crc_actual
        ));
    }

    let tables = decode_tables(payload)
        .with_context(|| format!("decode image {}", path.display()))?;
    Ok((tables, lsn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_tables;
    use crate::util::now_unix_ms;

    #[test]
    fn image_detects_corruption() {
        let root = std::env::temp_dir().join(format!(
            "bookstore-image-{}-{}",
            std::process::id(),
            now_unix_ms()
        ));
        fs::create_dir_all(&root).unwrap();

        let t = seed_tables().unwrap();
        write_image(&root, &t, 9).unwrap();
        let (back, lsn) = read_image(&root).unwrap();
        assert_eq!(lsn, 9);
        assert_eq!(back, t);

        let mut bytes = fs::read(image_path(&root)).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(image_path(&root), &bytes).unwrap();
        assert!(read_image(&root).is_err());

        let _ = fs::remove_dir_all(&root);
    }
}
