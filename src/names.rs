//! Name normalization
//!
//! Group and option labels are typed by hand in the back office, so "Borda ", "bordas"
//! and "BÓRDA" all turn up. Comparisons go through [`normalize_name`].

/// Normalize a label for comparison: trim, lowercase, fold Portuguese diacritics and
/// collapse runs of whitespace into a single space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.chars().flat_map(char::to_lowercase).map(fold).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check whether a normalized label contains any of the given keywords.
pub(crate) fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| normalized.contains(keyword))
}

fn fold(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
