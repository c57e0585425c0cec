// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for VCF-derived genotype tables
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

pub mod genotype_table;

pub use genotype_table::{
    cast_position, open_text, read_mask_positions, GenotypeTableError, GenotypeTableReader,
    WideRow, POS_COLUMN,
};
