//! store - high-level API хранилища книжного магазина.
//!
//! Разделение по подмодулям:
//! - core.rs     - структура Store, checkpoint(), Drop (clean shutdown)
//! - open.rs     - открытие/инициализация корня (lock, seed, replay)
//! - txn.rs      - Transaction: рабочая копия таблиц + один TXN-кадр WAL на коммит
//! - records.rs  - add/update/delete книг и авторов (ссылочные проверки)
//! - snapshot.rs - backup / restore (одно поколение)
//! - query.rs    - поиск и отчёт details (join книг с авторами)
//! - status.rs   - сводка о корне для CLI
//! - destroy.rs  - удаление всего персистентного состояния

pub mod core;
pub mod destroy;
pub mod open;
pub mod query;
pub mod records;
pub mod snapshot;
pub mod status;
pub mod txn;

pub use self::core::Store;
pub use destroy::destroy_storage;
pub use status::StoreStatus;
pub use txn::Transaction;
