// ==============================================================================
// lib.rs - Genotype Table Rewriter Library
// ==============================================================================
// Description: Library interface for genotype matrix to Parquet conversion
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

pub mod config;
pub mod genotype;
pub mod jobs;
pub mod models;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod rewriter;
pub mod tracts;
