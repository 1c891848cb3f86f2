/// Lowercases a column or rule name and joins its words with underscores.
///
/// `"Saving accounts"` and `" saving  accounts "` both become `saving_accounts`.
pub fn normalize_field_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
