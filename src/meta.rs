// src/meta.rs - storage root header (meta v1)
//
// Формат <root>/meta (LE):
// MAGIC8 = "BKSTMETA"
// u32 version          = 1
// u32 flags            (FLAG_SEEDED, остальное зарезервировано)
// u64 last_lsn         (LSN последнего чекпоинта)
// u8  clean_shutdown   (1=clean, 0=unclean)
// u64 created_unix_ms
//
// Политика:
// - Атомарная запись: tmp+rename, затем fsync родительского каталога.
// - Наличие meta означает, что корень инициализирован (образ и WAL созданы до meta).

use anyhow::{anyhow, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::consts::{META_FILE, META_MAGIC, META_VERSION};
use crate::util::{now_unix_ms, write_atomic};

/// Root was created with fixture data.
pub const FLAG_SEEDED: u32 = 0x1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaHeader {
    pub version: u32,
    pub flags: u32,
    pub last_lsn: u64,
    pub clean_shutdown: bool,
    pub created_unix_ms: u64,
}

impl Default for MetaHeader {
    fn default() -> Self {
        Self {
            version: META_VERSION,
            flags: 0,
            last_lsn: 0,
            clean_shutdown: true,
            created_unix_ms: now_unix_ms(),
        }
    }
}

impl MetaHeader {
    #[inline]
    pub fn seeded(&self) -> bool {
        self.flags & FLAG_SEEDED != 0
    }
}

#[inline]
pub fn meta_path(root: &Path) -> PathBuf {
    root.join(META_FILE)
}

#[inline]
pub fn meta_exists(root: &Path) -> bool {
    meta_path(root).exists()
}

fn encode_meta(h: &MetaHeader) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(40);
    buf.extend_from_slice(META_MAGIC);
    buf.write_u32::<LittleEndian>(h.version)?;
    buf.write_u32::<LittleEndian>(h.flags)?;
    buf.write_u64::<LittleEndian>(h.last_lsn)?;
    buf.write_u8(if h.clean_shutdown { 1 } else { 0 })?;
    buf.write_u64::<LittleEndian>(h.created_unix_ms)?;
    Ok(buf)
}

/// Создать новый meta. Ошибка, если уже существует.
pub fn write_meta_new(root: &Path, h: &MetaHeader) -> Result<()> {
    let path = meta_path(root);
    if path.exists() {
        return Err(anyhow!("meta already exists at {}", path.display()));
    }
    write_atomic(&path, &encode_meta(h)?)
}

/// Перезаписать meta через tmp+rename.
pub fn write_meta_overwrite(root: &Path, h: &MetaHeader) -> Result<()> {
    write_atomic(&meta_path(root), &encode_meta(h)?)
}

/// Прочитать meta.
pub fn read_meta(root: &Path) -> Result<MetaHeader> {
    let path = meta_path(root);
    let mut f = OpenOptions::new()
        .read(true)
        .open(&path)
        .with_context(|| format!("open meta {}", path.display()))?;

    let mut magic = [0u8; 8];
    f.read_exact(&mut magic)
        .with_context(|| format!("read meta magic {}", path.display()))?;
    if &magic != META_MAGIC {
        return Err(anyhow!(
            "bad meta magic at {} (expected {:?}, got {:?})",
            path.display(),
            META_MAGIC,
            magic
        ));
    }

    let version = f.read_u32::<LittleEndian>()?;
    if version != META_VERSION {
        return Err(anyhow!(
            "unsupported meta version {} at {} (expected {})",
            version,
            path.display(),
            META_VERSION
        ));
    }

    let flags = f.read_u32::<LittleEndian>()?;
    let last_lsn = f.read_u64::<LittleEndian>()?;
    let clean_shutdown = f.read_u8()? != 0;
    let created_unix_ms = f.read_u64::<LittleEndian>()?;

    Ok(MetaHeader {
        version,
        flags,
        last_lsn,
        clean_shutdown,
        created_unix_ms,
    })
}

/// Пометить meta.clean_shutdown (только при изменении).
pub fn set_clean_shutdown(root: &Path, clean: bool) -> Result<()> {
    let mut m = read_meta(root)?;
    if m.clean_shutdown != clean {
        m.clean_shutdown = clean;
        write_meta_overwrite(root, &m)?;
    }
    Ok(())
}

/// Обновить last_lsn, если new_lsn больше текущего.
pub fn set_last_lsn(root: &Path, new_lsn: u64) -> Result<()> {
    let mut m = read_meta(root)?;
    if new_lsn > m.last_lsn {
        m.last_lsn = new_lsn;
        write_meta_overwrite(root, &m)?;
    }
    Ok(())
}

/// Remove meta (best-effort helper for destroy).
pub(crate) fn remove_meta(root: &Path) -> Result<()> {
    let p = meta_path(root);
    if p.exists() {
        fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn meta_roundtrip_and_flags() {
        let root = std::env::temp_dir().join(format!(
            "bookstore-meta-{}-{}",
            std::process::id(),
            now_unix_ms()
        ));
        fs::create_dir_all(&root).unwrap();

        let m0 = MetaHeader {
            flags: FLAG_SEEDED,
            last_lsn: 12,
            clean_shutdown: false,
            ..MetaHeader::default()
        };
        write_meta_new(&root, &m0).unwrap();
        assert!(write_meta_new(&root, &m0).is_err(), "second create must fail");

        let m1 = read_meta(&root).unwrap();
        assert_eq!(m1, m0);
        assert!(m1.seeded());

        set_clean_shutdown(&root, true).unwrap();
        assert!(read_meta(&root).unwrap().clean_shutdown);

        set_last_lsn(&root, 40).unwrap();
        set_last_lsn(&root, 3).unwrap(); // never goes backwards
        assert_eq!(read_meta(&root).unwrap().last_lsn, 40);

        fs::write(meta_path(&root), b"NOTAMETA....").unwrap();
        assert!(read_meta(&root).is_err());

        let _ = fs::remove_dir_all(&root);
    }
}
