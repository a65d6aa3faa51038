//! WAL (BKSTWAL1) - журнал логических транзакций.
//!
//! Разделение:
//! - encode.rs - заголовок записи + CRC, запись кадра в writer.
//! - writer.rs - Wal: append одной TXN-записи на коммит, откат хвоста при сбое.
//! - reader.rs - последовательное чтение кадров с проверкой CRC.
//! - replay.rs - реплей поверх образа (LSN-гейтинг) и усечение битого хвоста.
//!
//! Файл: [magic8][reserved u64] + записи
//! [type u8][flags u8][reserved u16][lsn u64][len u32][crc32c u32] + payload.

use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::consts::{WAL_FILE, WAL_HDR_SIZE, WAL_MAGIC};

pub mod encode;
pub mod reader;
pub mod replay;
pub mod writer;

pub use replay::{replay_into, ReplayOutcome};
pub use writer::Wal;

/// CRC32C по двум срезам без промежуточного буфера.
#[inline]
pub fn crc32c_of_parts(head_without_crc: &[u8], payload: &[u8]) -> u32 {
    let c = crc32c::crc32c_append(0, head_without_crc);
    crc32c::crc32c_append(c, payload)
}

/// Записать 16-байтовый заголовок файла WAL в начало `f`.
pub fn write_wal_file_header(f: &mut File) -> Result<()> {
    f.seek(SeekFrom::Start(0))?;
    f.write_all(WAL_MAGIC)?;
    f.write_all(&[0u8; WAL_HDR_SIZE - 8])?;
    Ok(())
}

/// Проверить magic заголовка. Ошибка на коротком файле или чужой магии.
pub fn check_wal_file_header(f: &mut File) -> Result<()> {
    if f.metadata()?.len() < WAL_HDR_SIZE as u64 {
        return Err(anyhow!("wal too small (< header)"));
    }
    let mut magic = [0u8; 8];
    f.seek(SeekFrom::Start(0))?;
    f.read_exact(&mut magic)?;
    if &magic != WAL_MAGIC {
        return Err(anyhow!("bad WAL magic"));
    }
    Ok(())
}

#[inline]
pub fn wal_path(root: &Path) -> PathBuf {
    root.join(WAL_FILE)
}
