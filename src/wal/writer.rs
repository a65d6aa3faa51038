//! wal/writer - Wal: одна TXN-запись на коммит.
//!
//! Инвариант: на диске всегда лежит префикс из целых кадров. Если запись
//! кадра или fsync падают, хвост обрезается до длины перед append'ом; если
//! и это не удалось, журнал помечается broken и дальнейшие append'ы
//! отклоняются (до переоткрытия, где replay отрежет хвост по CRC).

use anyhow::{anyhow, Context, Result};
use log::{debug, error};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::consts::{WAL_HDR_SIZE, WAL_REC_TXN};
use crate::metrics::{record_wal_append, record_wal_fsync, record_wal_truncation};
use crate::util::fsync_dir;

use super::{check_wal_file_header, encode, wal_path, write_wal_file_header};

pub struct Wal {
    file: File,
    path: PathBuf,
    len: u64,
    broken: bool,
}

impl Wal {
    /// Создать (или пересоздать) пустой журнал: только заголовок.
    pub fn create(root: &Path) -> Result<Self> {
        let path = wal_path(root);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("create wal {}", path.display()))?;
        write_wal_file_header(&mut file)?;
        file.sync_all()?;
        let _ = fsync_dir(&path);
        Ok(Self {
            file,
            path,
            len: WAL_HDR_SIZE as u64,
            broken: false,
        })
    }

    /// Открыть существующий журнал на дозапись (после replay).
    pub fn open_for_append(root: &Path) -> Result<Self> {
        let path = wal_path(root);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("open wal {}", path.display()))?;
        check_wal_file_header(&mut file)
            .with_context(|| format!("validate wal {}", path.display()))?;
        let len = file.seek(SeekFrom::End(0))?;
        Ok(Self {
            file,
            path,
            len,
            broken: false,
        })
    }

    /// Текущая длина файла (заголовок + целые кадры).
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Нет ни одной записи после заголовка.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len <= WAL_HDR_SIZE as u64
    }

    #[inline]
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Дописать TXN-кадр; при `sync` кадр durable по возврату Ok.
    pub fn commit_record(&mut self, lsn: u64, payload: &[u8], sync: bool) -> Result<()> {
        if self.broken {
            return Err(anyhow!(
                "wal {} is unusable after a failed rollback; reopen the store",
                self.path.display()
            ));
        }

        let start = self.len;
        let res = (|| -> Result<u64> {
            self.file.seek(SeekFrom::Start(start))?;
            let n = encode::write_record(&mut self.file, WAL_REC_TXN, lsn, payload)?;
            if sync {
                self.file.sync_data()?;
                record_wal_fsync();
            }
            Ok(n)
        })();

        match res {
            Ok(n) => {
                self.len = start + n;
                record_wal_append(n as usize);
                debug!("wal: lsn={} appended {} B (len={})", lsn, n, self.len);
                Ok(())
            }
            Err(e) => {
                if let Err(te) = self.rollback_to(start) {
                    self.broken = true;
                    error!(
                        "wal: rollback of failed append at {} failed: {:#}",
                        start, te
                    );
                }
                Err(e.context(format!("append lsn {} to {}", lsn, self.path.display())))
            }
        }
    }

    fn rollback_to(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.file.seek(SeekFrom::Start(len))?;
        self.file.sync_data()?;
        self.len = len;
        record_wal_truncation();
        Ok(())
    }

    /// Усечь до заголовка (после чекпоинта образа).
    pub fn truncate_to_header(&mut self) -> Result<()> {
        self.file.set_len(WAL_HDR_SIZE as u64)?;
        self.file.seek(SeekFrom::End(0))?;
        self.file.sync_all()?;
        self.len = WAL_HDR_SIZE as u64;
        self.broken = false;
        record_wal_truncation();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::now_unix_ms;
    use std::fs;

    fn tmp_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "bookstore-wal-{}-{}-{}",
            tag,
            std::process::id(),
            now_unix_ms()
        ));
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn append_grows_and_truncate_resets() {
        let root = tmp_root("append");
        let mut wal = Wal::create(&root).unwrap();
        assert!(wal.is_empty());

        wal.commit_record(1, b"abc", true).unwrap();
        wal.commit_record(2, b"", false).unwrap();
        assert_eq!(
            wal.len(),
            (WAL_HDR_SIZE + 2 * crate::consts::WAL_REC_HDR_SIZE + 3) as u64
        );
        assert_eq!(fs::metadata(wal_path(&root)).unwrap().len(), wal.len());

        drop(wal);
        let mut wal = Wal::open_for_append(&root).unwrap();
        assert!(!wal.is_empty());
        wal.truncate_to_header().unwrap();
        assert!(wal.is_empty());
        assert_eq!(
            fs::metadata(wal_path(&root)).unwrap().len(),
            WAL_HDR_SIZE as u64
        );

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn foreign_file_is_rejected() {
        let root = tmp_root("magic");
        fs::write(wal_path(&root), b"NOTAWAL!........").unwrap();
        assert!(Wal::open_for_append(&root).is_err());
        let _ = fs::remove_dir_all(&root);
    }
}
