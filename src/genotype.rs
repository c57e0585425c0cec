// ==============================================================================
// genotype.rs - Phased Genotype Code Parsing
// ==============================================================================
// Description: Splits "a|b" genotype codes into two signed allele integers
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================
// Format:
//   offset 0 -> Allele1 (single digit)
//   offset 1 -> separator ('|' phased or '/' unphased), ignored
//   offset 2 -> Allele2 (single digit)
//   anything after offset 2 is ignored
// ==============================================================================

use thiserror::Error;

/// Errors that can occur while splitting a genotype code
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenotypeParseError {
    #[error("Invalid genotype '{0}' (expected at least 3 characters, e.g. \"0|1\")")]
    TooShort(String),

    #[error("Invalid allele '{allele}' at offset {offset} of genotype '{genotype}'")]
    InvalidAllele {
        genotype: String,
        offset: usize,
        allele: char,
    },
}

/// Parse a genotype code into `(Allele1, Allele2)`
///
/// # Examples
/// ```
/// use genotype_rewriter::genotype::parse_genotype;
///
/// assert_eq!(parse_genotype("0|1").unwrap(), (0, 1));
/// assert_eq!(parse_genotype("1/1").unwrap(), (1, 1));
/// assert!(parse_genotype(".|.").is_err());
/// ```
pub fn parse_genotype(genotype: &str) -> Result<(i8, i8), GenotypeParseError> {
    let mut chars = genotype.chars();
    let (first, second) = match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(_), Some(b)) => (a, b),
        _ => return Err(GenotypeParseError::TooShort(genotype.to_string())),
    };

    Ok((allele(genotype, 0, first)?, allele(genotype, 2, second)?))
}

fn allele(genotype: &str, offset: usize, c: char) -> Result<i8, GenotypeParseError> {
    c.to_digit(10)
        .map(|d| d as i8)
        .ok_or_else(|| GenotypeParseError::InvalidAllele {
            genotype: genotype.to_string(),
            offset,
            allele: c,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phased_codes() {
        assert_eq!(parse_genotype("0|0").unwrap(), (0, 0));
        assert_eq!(parse_genotype("0|1").unwrap(), (0, 1));
        assert_eq!(parse_genotype("1|0").unwrap(), (1, 0));
        assert_eq!(parse_genotype("1|1").unwrap(), (1, 1));
    }

    #[test]
    fn test_separator_ignored() {
        assert_eq!(parse_genotype("2/3").unwrap(), (2, 3));
        assert_eq!(parse_genotype("9x7").unwrap(), (9, 7));
    }

    #[test]
    fn test_trailing_characters_ignored() {
        // Only offsets 0 and 2 are read, so "0|1:0.98" style cells still split
        assert_eq!(parse_genotype("0|1:0.98").unwrap(), (0, 1));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            parse_genotype("0|"),
            Err(GenotypeParseError::TooShort("0|".to_string()))
        );
        assert!(matches!(
            parse_genotype(""),
            Err(GenotypeParseError::TooShort(_))
        ));
    }

    #[test]
    fn test_missing_allele() {
        match parse_genotype("0|.") {
            Err(GenotypeParseError::InvalidAllele { offset, allele, .. }) => {
                assert_eq!(offset, 2);
                assert_eq!(allele, '.');
            }
            other => panic!("Expected InvalidAllele error, got {:?}", other),
        }

        match parse_genotype(".|0") {
            Err(GenotypeParseError::InvalidAllele { offset, .. }) => assert_eq!(offset, 0),
            other => panic!("Expected InvalidAllele error, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_digit_allele_rejected() {
        // Offset 2 of "10|1" is the separator
        assert!(matches!(
            parse_genotype("10|1"),
            Err(GenotypeParseError::InvalidAllele { offset: 2, allele: '|', .. })
        ));
    }
}
