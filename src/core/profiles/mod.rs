// User profiles live in an external store; this module is only the port.

pub mod user_store;

pub use user_store::{
    Counter, ProfileUpdate, StoreError, UserRecord, UserStore, DEFAULT_COLOR, STARTING_BALANCE,
};
