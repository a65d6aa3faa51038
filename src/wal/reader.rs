//! wal/reader - последовательное чтение кадров WAL с проверкой CRC.
//!
//! Толерантен к хвосту: неполный заголовок/payload и CRC mismatch дают
//! Ok(None) - всё, что за последним целым кадром, считается не записанным.
//!
//! Использование:
//!   let len = file.metadata()?.len();
//!   let mut pos = WAL_HDR_SIZE as u64;
//!   while let Some((rec, next)) = read_next_record(&mut file, pos, len)? {
//!       /* обработка rec */
//!       pos = next;
//!   }

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::warn;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use super::crc32c_of_parts;
use crate::consts::{
    WAL_REC_HDR_SIZE, WAL_REC_OFF_CRC32, WAL_REC_OFF_FLAGS, WAL_REC_OFF_LEN, WAL_REC_OFF_LSN,
    WAL_REC_OFF_TYPE,
};

/// Одна запись WAL, считанная с диска.
#[derive(Debug)]
pub struct WalRecord {
    pub rec_type: u8,
    pub flags: u8,
    pub lsn: u64,
    pub payload: Vec<u8>,
    /// Смещение заголовка записи.
    pub pos: u64,
    /// Заголовок + payload.
    pub len_total: u64,
}

/// Считать запись с позиции `pos`; `file_len` - длина файла.
///
/// - Ok(Some((rec, next_pos))) - целая валидная запись;
/// - Ok(None) - EOF, неполный хвост или CRC mismatch;
/// - Err - ошибка ввода-вывода.
pub fn read_next_record(f: &mut File, pos: u64, file_len: u64) -> Result<Option<(WalRecord, u64)>> {
    if pos + (WAL_REC_HDR_SIZE as u64) > file_len {
        return Ok(None);
    }

    f.seek(SeekFrom::Start(pos))?;
    let mut rhdr = [0u8; WAL_REC_HDR_SIZE];
    if let Err(e) = f.read_exact(&mut rhdr) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(anyhow!("wal read header: {}", e));
    }

    let payload_len = LittleEndian::read_u32(&rhdr[WAL_REC_OFF_LEN..WAL_REC_OFF_LEN + 4]) as u64;
    let total = WAL_REC_HDR_SIZE as u64 + payload_len;
    let next_pos = pos + total;
    if next_pos > file_len {
        return Ok(None);
    }

    let mut payload = vec![0u8; payload_len as usize];
    if let Err(e) = f.read_exact(&mut payload) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(anyhow!("wal read payload: {}", e));
    }

    let stored_crc = LittleEndian::read_u32(&rhdr[WAL_REC_OFF_CRC32..WAL_REC_OFF_CRC32 + 4]);
    let calc_crc = crc32c_of_parts(&rhdr[..WAL_REC_OFF_CRC32], &payload);
    if stored_crc != calc_crc {
        warn!(
            "wal: CRC mismatch at pos {} (stored={:08x}, calc={:08x}), treating as tail",
            pos, stored_crc, calc_crc
        );
        return Ok(None);
    }

    let rec = WalRecord {
        rec_type: rhdr[WAL_REC_OFF_TYPE],
        flags: rhdr[WAL_REC_OFF_FLAGS],
        lsn: LittleEndian::read_u64(&rhdr[WAL_REC_OFF_LSN..WAL_REC_OFF_LSN + 8]),
        payload,
        pos,
        len_total: total,
    };
    Ok(Some((rec, next_pos)))
}
