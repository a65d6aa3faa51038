//! store/destroy - удаление всего персистентного состояния корня.
//!
//! meta удаляется первой: прерванное удаление оставляет неинициализированный
//! корень, и следующий open создаст его заново.

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;

use crate::consts::STORAGE_FILES;
use crate::error::StoreResult;
use crate::lock::{lock_file_path, try_acquire_exclusive_lock};
use crate::meta::remove_meta;

use super::core::Store;

impl Store {
    /// Уничтожить хранилище этого хэндла. Drop после этого ничего не пишет.
    pub fn destroy(mut self) -> StoreResult<()> {
        self.destroyed = true;
        remove_storage_files(&self.root)?;
        info!("destroyed storage at {}", self.root.display());
        Ok(())
    }
}

/// Уничтожить хранилище по пути (корень не должен быть открыт).
/// Отсутствующий корень - не ошибка.
pub fn destroy_storage(root: &Path) -> StoreResult<()> {
    if !root.exists() {
        debug!("destroy: {} does not exist", root.display());
        return Ok(());
    }
    let lock = try_acquire_exclusive_lock(root)?;
    remove_storage_files(root)?;
    drop(lock);
    info!("destroyed storage at {}", root.display());
    Ok(())
}

fn remove_storage_files(root: &Path) -> Result<()> {
    remove_meta(root)?;
    for name in STORAGE_FILES {
        let p = root.join(name);
        if p.exists() {
            fs::remove_file(&p).with_context(|| format!("remove {}", p.display()))?;
        }
        let tmp = p.with_extension("tmp");
        if tmp.exists() {
            let _ = fs::remove_file(&tmp);
        }
    }
    let _ = fs::remove_file(lock_file_path(root));
    // best-effort: только если каталог опустел
    let _ = fs::remove_dir(root);
    Ok(())
}
