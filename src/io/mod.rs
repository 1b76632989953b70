// Import/export of ledger data

pub mod export;

pub use export::*;
