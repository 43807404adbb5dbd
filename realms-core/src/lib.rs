#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod abi;
pub mod constants;
pub mod error;
pub mod grid;
pub mod lore;
pub mod whitelist;
pub mod word;

pub use abi::{execute, Call};
pub use error::{CalldataError, ErrorClass, GridError, InvokeError, LoreError};
pub use grid::{calc_size, clear_bit, get_bit, set_bit, BitAddress, BitmapGrid, GridLayout};
pub use lore::{
    AssetId, Content, Entity, EntityId, EntityRecord, LoreStore, Poi, Prop, Revision, RevisionId,
};
pub use whitelist::{Approval, Category, Whitelist};
pub use word::{Word, WordParseError};
