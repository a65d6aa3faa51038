//! wal/replay - накат журнала поверх загруженного образа.
//!
//! - Записи с lsn <= lsn образа уже учтены в образе и пропускаются.
//! - TXN-запись применяется целиком (все её Op) или не применяется вовсе:
//!   первая непрочитанная запись (торн/CRC) завершает реплей.
//! - Хвост после последнего целого кадра обрезается.
//! - Неизвестные типы записей пропускаются.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::OpenOptions;
use std::path::Path;

use crate::codec::decode_txn;
use crate::consts::{WAL_HDR_SIZE, WAL_REC_TXN};
use crate::metrics::{record_replayed_txns, record_wal_truncation};
use crate::tables::Tables;

use super::reader::read_next_record;
use super::{check_wal_file_header, wal_path, write_wal_file_header};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Применённые транзакции.
    pub applied: u64,
    /// Максимальный LSN среди валидных записей (или lsn образа).
    pub last_lsn: u64,
    /// Длина валидного префикса файла.
    pub valid_len: u64,
    /// Сколько байт хвоста было отрезано.
    pub truncated_bytes: u64,
}

pub fn replay_into(root: &Path, tables: &mut Tables, from_lsn: u64) -> Result<ReplayOutcome> {
    let path = wal_path(root);
    let mut out = ReplayOutcome {
        last_lsn: from_lsn,
        valid_len: WAL_HDR_SIZE as u64,
        ..ReplayOutcome::default()
    };

    let mut f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("open wal {}", path.display()))?;

    if f.metadata()?.len() < WAL_HDR_SIZE as u64 {
        warn!(
            "wal replay: {} shorter than header, rewriting empty journal",
            path.display()
        );
        f.set_len(0)?;
        write_wal_file_header(&mut f)?;
        f.sync_all()?;
        return Ok(out);
    }
    check_wal_file_header(&mut f).with_context(|| format!("validate wal {}", path.display()))?;

    let len = f.metadata()?.len();
    let mut pos = WAL_HDR_SIZE as u64;
    while let Some((rec, next)) = read_next_record(&mut f, pos, len)? {
        pos = next;
        if rec.lsn <= from_lsn {
            debug!("wal replay: skip lsn={} (<= image lsn {})", rec.lsn, from_lsn);
            continue;
        }
        match rec.rec_type {
            WAL_REC_TXN => {
                let ops = decode_txn(&rec.payload)
                    .with_context(|| format!("decode txn lsn={} at pos {}", rec.lsn, rec.pos))?;
                for op in &ops {
                    tables
                        .apply(op)
                        .with_context(|| format!("apply txn lsn={}", rec.lsn))?;
                }
                out.applied += 1;
            }
            other => {
                debug!("wal replay: skip unknown record type {}", other);
            }
        }
        out.last_lsn = out.last_lsn.max(rec.lsn);
    }
    out.valid_len = pos;

    if len > pos {
        out.truncated_bytes = len - pos;
        warn!(
            "wal replay: discarding {} byte(s) of torn tail at {} in {}",
            out.truncated_bytes,
            pos,
            path.display()
        );
        f.set_len(pos)?;
        f.sync_all()?;
        record_wal_truncation();
    }

    if out.applied > 0 {
        info!(
            "WAL replay: applied {} transaction(s), last lsn {}",
            out.applied, out.last_lsn
        );
        record_replayed_txns(out.applied);
    } else {
        debug!("WAL replay: nothing to apply");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_txn;
    use crate::model::{Author, Book};
    use crate::tables::Op;
    use crate::util::now_unix_ms;
    use crate::wal::Wal;
    use std::fs;

    fn tmp_root(tag: &str) -> std::path::PathBuf {
        let root = std::env::temp_dir().join(format!(
            "bookstore-replay-{}-{}-{}",
            tag,
            std::process::id(),
            now_unix_ms()
        ));
        fs::create_dir_all(&root).unwrap();
        root
    }

    fn author_txn(id: i64) -> Vec<u8> {
        encode_txn(&[Op::InsertAuthor(Author {
            id,
            name: format!("a{id}"),
            country: "X".into(),
        })])
        .unwrap()
    }

    #[test]
    fn replay_skips_image_lsns_and_cuts_torn_tail() {
        let root = tmp_root("tail");
        let mut wal = Wal::create(&root).unwrap();
        wal.commit_record(1, &author_txn(1), true).unwrap();
        wal.commit_record(2, &author_txn(2), true).unwrap();
        let book = encode_txn(&[Op::InsertBook(Book {
            id: 1,
            title: "t".into(),
            author_id: 2,
            qty: 1,
        })])
        .unwrap();
        wal.commit_record(3, &book, true).unwrap();
        let full = wal.len();
        drop(wal);

        // отрежем половину последнего кадра
        let f = OpenOptions::new().write(true).open(wal_path(&root)).unwrap();
        f.set_len(full - 5).unwrap();
        drop(f);

        // образ уже содержит lsn=1
        let mut t = Tables::new();
        t.apply(&Op::InsertAuthor(Author {
            id: 1,
            name: "a1".into(),
            country: "X".into(),
        }))
        .unwrap();

        let out = replay_into(&root, &mut t, 1).unwrap();
        assert_eq!(out.applied, 1);
        assert_eq!(out.last_lsn, 2);
        assert!(out.truncated_bytes > 0);
        assert_eq!(t.authors().count(), 2);
        assert_eq!(t.books().count(), 0);
        assert_eq!(fs::metadata(wal_path(&root)).unwrap().len(), out.valid_len);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn crc_damage_stops_replay() {
        let root = tmp_root("crc");
        let mut wal = Wal::create(&root).unwrap();
        wal.commit_record(1, &author_txn(1), true).unwrap();
        let first_end = wal.len();
        wal.commit_record(2, &author_txn(2), true).unwrap();
        drop(wal);

        let mut bytes = fs::read(wal_path(&root)).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x5A;
        fs::write(wal_path(&root), &bytes).unwrap();

        let mut t = Tables::new();
        let out = replay_into(&root, &mut t, 0).unwrap();
        assert_eq!(out.applied, 1);
        assert_eq!(out.valid_len, first_end);
        assert!(t.author(1).is_some());
        assert!(t.author(2).is_none());

        let _ = fs::remove_dir_all(&root);
    }
}
