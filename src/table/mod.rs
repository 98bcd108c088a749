//! Tabular input and output.
//!
//! Adapters between the core model and rows of string cells, the shape a
//! spreadsheet or CSV reader produces. File formats stay with the caller.

mod reader;
mod synonyms;
mod writer;

pub use reader::read_participants;
pub use synonyms::{value_distribution, DistributionOrder, SynonymMap};
pub use writer::{write_assignment, TableRow};
