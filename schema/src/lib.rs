// SCADAmon Schema - Shared type definitions
// This crate contains the data-table types shared between the main scadamon
// crate and its build script, so the tables can be validated at build time
// and embedded as postcard bytes.

pub use element::*;
pub use moves::*;
pub use species::*;
pub use tables::*;
pub use trainers::*;

pub mod element;
pub mod moves;
pub mod species;
pub mod tables;
pub mod trainers;
