pub mod dsu;
pub mod newtype_index;
pub mod time;
