//! Translation Module
//!
//! Maps codon triplets to single-letter amino acids via the standard
//! genetic code. Stop codons map to `*`; codons containing characters
//! outside `{A,C,G,T}` map to the ambiguous marker `X` rather than
//! failing, and an empty codon translates to an empty string.

use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Marker for stop codons.
pub const STOP: char = '*';

/// Marker for codons with non-standard bases.
pub const AMBIGUOUS: char = 'X';

/// Standard genetic code codon table.
static CODON_TABLE: LazyLock<FxHashMap<&'static str, char>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    // Phenylalanine (F)
    table.insert("TTT", 'F'); table.insert("TTC", 'F');
    // Leucine (L)
    table.insert("TTA", 'L'); table.insert("TTG", 'L');
    table.insert("CTT", 'L'); table.insert("CTC", 'L');
    table.insert("CTA", 'L'); table.insert("CTG", 'L');
    // Isoleucine (I)
    table.insert("ATT", 'I'); table.insert("ATC", 'I'); table.insert("ATA", 'I');
    // Methionine (M) - Start
    table.insert("ATG", 'M');
    // Valine (V)
    table.insert("GTT", 'V'); table.insert("GTC", 'V');
    table.insert("GTA", 'V'); table.insert("GTG", 'V');
    // Serine (S)
    table.insert("TCT", 'S'); table.insert("TCC", 'S');
    table.insert("TCA", 'S'); table.insert("TCG", 'S');
    table.insert("AGT", 'S'); table.insert("AGC", 'S');
    // Proline (P)
    table.insert("CCT", 'P'); table.insert("CCC", 'P');
    table.insert("CCA", 'P'); table.insert("CCG", 'P');
    // Threonine (T)
    table.insert("ACT", 'T'); table.insert("ACC", 'T');
    table.insert("ACA", 'T'); table.insert("ACG", 'T');
    // Alanine (A)
    table.insert("GCT", 'A'); table.insert("GCC", 'A');
    table.insert("GCA", 'A'); table.insert("GCG", 'A');
    // Tyrosine (Y)
    table.insert("TAT", 'Y'); table.insert("TAC", 'Y');
    // Stop codons (*)
    table.insert("TAA", STOP); table.insert("TAG", STOP); table.insert("TGA", STOP);
    // Histidine (H)
    table.insert("CAT", 'H'); table.insert("CAC", 'H');
    // Glutamine (Q)
    table.insert("CAA", 'Q'); table.insert("CAG", 'Q');
    // Asparagine (N)
    table.insert("AAT", 'N'); table.insert("AAC", 'N');
    // Lysine (K)
    table.insert("AAA", 'K'); table.insert("AAG", 'K');
    // Aspartic acid (D)
    table.insert("GAT", 'D'); table.insert("GAC", 'D');
    // Glutamic acid (E)
    table.insert("GAA", 'E'); table.insert("GAG", 'E');
    // Cysteine (C)
    table.insert("TGT", 'C'); table.insert("TGC", 'C');
    // Tryptophan (W)
    table.insert("TGG", 'W');
    // Arginine (R)
    table.insert("CGT", 'R'); table.insert("CGC", 'R');
    table.insert("CGA", 'R'); table.insert("CGG", 'R');
    table.insert("AGA", 'R'); table.insert("AGG", 'R');
    // Glycine (G)
    table.insert("GGT", 'G'); table.insert("GGC", 'G');
    table.insert("GGA", 'G'); table.insert("GGG", 'G');
    table
});

/// Translates a codon (3 nucleotides) to its amino acid, or `None` when
/// the codon is not in the standard table.
pub fn translate_codon(codon: &str) -> Option<char> {
    let upper = codon.to_uppercase();
    CODON_TABLE.get(upper.as_str()).copied()
}

/// Translates one half of a codon pair for the report.
///
/// Empty input (a missing reference allele) yields an empty translation;
/// a codon with non-standard bases yields the ambiguous marker.
pub fn translate_half(codon: &str) -> String {
    if codon.is_empty() {
        return String::new();
    }
    match translate_codon(codon) {
        Some(aa) => aa.to_string(),
        None => AMBIGUOUS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_codon() {
        assert_eq!(translate_codon("ATG"), Some('M'));
        assert_eq!(translate_codon("TTT"), Some('F'));
        assert_eq!(translate_codon("CGA"), Some('R'));
        assert_eq!(translate_codon("ttg"), Some('L'));
        assert_eq!(translate_codon("NNN"), None);
    }

    #[test]
    fn test_table_is_complete() {
        // All 64 codons over {A,C,G,T} are present
        let bases = ['A', 'C', 'G', 'T'];
        let mut count = 0;
        for a in bases {
            for b in bases {
                for c in bases {
                    let codon: String = [a, b, c].iter().collect();
                    assert!(
                        translate_codon(&codon).is_some(),
                        "missing codon {}",
                        codon
                    );
                    count += 1;
                }
            }
        }
        assert_eq!(count, 64);
    }

    #[test]
    fn test_stop_codons() {
        assert_eq!(translate_codon("TAA"), Some(STOP));
        assert_eq!(translate_codon("TAG"), Some(STOP));
        assert_eq!(translate_codon("TGA"), Some(STOP));
    }

    #[test]
    fn test_translate_half() {
        assert_eq!(translate_half("ATG"), "M");
        assert_eq!(translate_half("TAA"), "*");
        assert_eq!(translate_half("ANG"), "X");
        assert_eq!(translate_half(""), "");
    }

    #[test]
    fn test_translation_is_pure() {
        for _ in 0..3 {
            assert_eq!(translate_half("CGA"), "R");
        }
    }
}
