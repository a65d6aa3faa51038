// Базовые модули
pub mod consts;
pub mod util;
pub mod error;
pub mod model;
pub mod config;
pub mod metrics;

// Хранение: meta, образ таблиц, WAL, блокировка
pub mod lock;
pub mod meta;
pub mod codec;
pub mod image;
pub mod wal;   // src/wal/{mod,encode,writer,reader,replay}.rs

// Логика: таблицы, аллокатор id, seed, high-level Store
pub mod tables;
pub mod alloc;
pub mod seed;
pub mod store; // src/store/{mod,core,open,txn,records,snapshot,query,status,destroy}.rs

// Интерактивное меню
pub mod shell;

// Удобные реэкспорты
pub use alloc::{IdAllocator, RandomWidthAllocator, SequentialAllocator};
pub use config::{IdStrategy, StoreBuilder, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use model::{
    Author, AuthorId, Book, BookDetail, BookField, BookId, BookUpdate, SearchField, SearchKey,
};
pub use shell::run_shell;
pub use store::{destroy_storage, Store, StoreStatus, Transaction};
