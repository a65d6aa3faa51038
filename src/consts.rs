//! Общие константы форматов (meta, image, WAL, lock).

// -------- Lock --------
pub const LOCK_FILE: &str = "LOCK";

// -------- Meta --------
pub const META_MAGIC: &[u8; 8] = b"BKSTMETA";
pub const META_FILE: &str = "meta";
pub const META_VERSION: u32 = 1;

// -------- Checkpoint image --------
// Layout (LE):
// [magic8="BKSTIMG1"][version u32][reserved u32][lsn u64][payload_len u64][crc32c u32] + payload
pub const IMAGE_FILE: &str = "tables.img";
pub const IMAGE_MAGIC: &[u8; 8] = b"BKSTIMG1";
pub const IMAGE_VERSION: u32 = 1;
pub const IMAGE_HDR_SIZE: usize = 8 + 4 + 4 + 8 + 8 + 4;

// -------- WAL --------
pub const WAL_FILE: &str = "wal-000001.log";
pub const WAL_MAGIC: &[u8; 8] = b"BKSTWAL1";
pub const WAL_HDR_SIZE: usize = 16; // magic8 + reserved u64

// Формат записи WAL:
// [type u8][flags u8][reserved u16][lsn u64][len u32][crc32c u32]
// CRC считается по header[0..crc) + payload.
pub const WAL_REC_HDR_SIZE: usize = 20;

pub const WAL_REC_OFF_TYPE: usize = 0;
pub const WAL_REC_OFF_FLAGS: usize = 1;
pub const WAL_REC_OFF_RESERVED: usize = 2;
pub const WAL_REC_OFF_LSN: usize = 4;
pub const WAL_REC_OFF_LEN: usize = 12;
pub const WAL_REC_OFF_CRC32: usize = 16;

// Типы записей WAL. Одна транзакция = одна запись TXN.
pub const WAL_REC_TXN: u8 = 1;

// Default checkpoint threshold for the WAL (bytes).
pub const WAL_CHECKPOINT_BYTES: u64 = 1024 * 1024;

// Files that make up a storage root (removed by destroy).
pub const STORAGE_FILES: &[&str] = &[META_FILE, IMAGE_FILE, WAL_FILE];
