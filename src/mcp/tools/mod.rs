//! MCP tool handlers.

pub mod abelian_invariants;
pub mod automorphisms;
pub mod center;
pub mod character_table;
pub mod conjugacy_classes;
pub mod derived_series;
pub mod elements;
pub mod eval;
pub mod group_info;
pub mod isomorphism;
pub mod load_package;
pub mod reset;
pub mod subgroups;
pub mod sylow;
pub mod util;
