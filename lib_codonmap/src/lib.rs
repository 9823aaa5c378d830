pub mod aggregate;
pub mod annotation;
pub mod batch;
pub mod common_sites;
pub mod coordinate_system;
pub mod error;
pub mod fasta;
pub mod index_types;
mod io;
pub mod mapping_table;
pub mod position_index;
pub mod selection;
pub mod statistics;
pub mod translate;
