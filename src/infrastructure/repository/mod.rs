//! Repository implementations.

pub mod inmemory;

pub use inmemory::player::InMemoryPlayerRegistry;
pub use inmemory::room::InMemoryRoomStore;
