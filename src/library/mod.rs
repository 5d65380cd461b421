//! Recordings, folders and the store that holds them

pub mod item;
pub mod navigation;
pub mod store;

pub use item::{Folder, Item, Recording};
pub use navigation::NavigationState;
pub use store::{Store, StoreChange};
