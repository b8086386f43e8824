pub mod inventory;

pub use inventory::{
    check_new_item, seed_records,
    ItemDraft, ItemError, ItemRecord, SEED_ITEMS,
};
