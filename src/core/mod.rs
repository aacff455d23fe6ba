/// Item reading abstractions shared by all readers.
pub mod item;

/// Byte-source abstraction resolved by readers at open time.
pub mod resource;
