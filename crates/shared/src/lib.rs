pub mod domain;
pub mod error;
pub mod protocol;
pub mod roster_csv;
pub mod settings;
