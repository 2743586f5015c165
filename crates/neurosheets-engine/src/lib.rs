//! neurosheets-engine - cells, formulas and evaluation.

pub mod engine;
