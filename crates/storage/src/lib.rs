pub mod db;

pub use db::{
    create_db, read_slot, read_slot_raw, write_slot, write_slot_raw, DbPool, StorageError,
    MAPPINGS_SLOT, RECORDS_SLOT,
};
