//! wal/encode - кодирование и запись кадров WAL.
//!
//! - build_hdr_with_crc: заголовок записи (20 байт) с CRC32C по
//!   header[0..crc) + payload.
//! - write_record: [header][payload] по текущей позиции writer'а.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::io::Write;

use super::crc32c_of_parts;
use crate::consts::{
    WAL_REC_HDR_SIZE, WAL_REC_OFF_CRC32, WAL_REC_OFF_FLAGS, WAL_REC_OFF_LEN, WAL_REC_OFF_LSN,
    WAL_REC_OFF_RESERVED, WAL_REC_OFF_TYPE,
};

pub fn build_hdr_with_crc(rec_type: u8, lsn: u64, payload: &[u8]) -> [u8; WAL_REC_HDR_SIZE] {
    let mut hdr = [0u8; WAL_REC_HDR_SIZE];
    hdr[WAL_REC_OFF_TYPE] = rec_type;
    hdr[WAL_REC_OFF_FLAGS] = 0;
    LittleEndian::write_u16(&mut hdr[WAL_REC_OFF_RESERVED..WAL_REC_OFF_RESERVED + 2], 0);
    LittleEndian::write_u64(&mut hdr[WAL_REC_OFF_LSN..WAL_REC_OFF_LSN + 8], lsn);
    LittleEndian::write_u32(
        &mut hdr[WAL_REC_OFF_LEN..WAL_REC_OFF_LEN + 4],
        payload.len() as u32,
    );

    let crc = crc32c_of_parts(&hdr[..WAL_REC_OFF_CRC32], payload);
    LittleEndian::write_u32(&mut hdr[WAL_REC_OFF_CRC32..WAL_REC_OFF_CRC32 + 4], crc);
    hdr
}

/// Записать один кадр. Без seek: позицию выставляет вызывающий код.
/// Возвращает полный размер кадра в байтах.
pub fn write_record<W: Write>(
    writer: &mut W,
    rec_type: u8,
    lsn: u64,
    payload: &[u8],
) -> Result<u64> {
    if payload.len() > u32::MAX as usize {
        return Err(anyhow!(
            "payload too large for WAL record: {} bytes (max {})",
            payload.len(),
            u32::MAX
        ));
    }

    let hdr = build_hdr_with_crc(rec_type, lsn, payload);
    writer.write_all(&hdr)?;
    if !payload.is_empty() {
        writer.write_all(payload)?;
    }
    Ok((WAL_REC_HDR_SIZE + payload.len()) as u64)
}
