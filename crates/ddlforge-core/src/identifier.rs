//! Identifier shortening and default constraint naming.

use crate::model::ForeignKey;

/// Shortens `name` to at most `max_len` characters.
///
/// Truncation removes characters from the middle, keeping the head and tail,
/// which keeps similarly-prefixed names distinguishable. The cut point is
/// shifted so that neither side of the seam exposes a stray `_`. The result
/// is deterministic for a given input and limit.
#[must_use]
pub fn shorten(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }
    if max_len == 0 {
        return String::new();
    }
    if !name.is_ascii() {
        // Non-ASCII identifiers are rare enough that a plain prefix cut is fine.
        return name.chars().take(max_len).collect();
    }

    let bytes = name.as_bytes();
    let mut front = max_len / 2;
    let mut back = max_len - front;
    loop {
        if front > 0 && bytes[front - 1] == b'_' {
            front -= 1;
            back += 1;
            continue;
        }
        if front > 0 && back < name.len() && bytes[name.len() - back] == b'_' {
            front -= 1;
            back += 1;
            continue;
        }
        break;
    }

    format!("{}{}", &name[..front], &name[name.len() - back..])
}

/// Returns the effective name of a foreign key, shortened to `max_len`.
///
/// If the key is unnamed, a deterministic name is synthesized from the owning
/// table name, the local column names, and the foreign table name.
#[must_use]
pub fn foreign_key_name(table_name: &str, fk: &ForeignKey, max_len: usize) -> String {
    match &fk.name {
        Some(name) => shorten(name, max_len),
        None => {
            let mut parts = vec![table_name.to_string()];
            parts.extend(fk.references.iter().map(|r| r.local.clone()));
            parts.push(fk.foreign_table.clone());
            shorten(&parts.join("_"), max_len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names_unchanged() {
        assert_eq!(shorten("orders", 30), "orders");
        assert_eq!(shorten("orders", 6), "orders");
    }

    #[test]
    fn test_middle_truncation_keeps_head_and_tail() {
        let result = shorten("a_very_long_identifier_name_exceeding_limit", 10);
        assert_eq!(result.len(), 10);
        assert_eq!(result, "a_verlimit");
        assert!(!result.starts_with('_'));
        assert!(!result.ends_with('_'));
    }

    #[test]
    fn test_no_stray_delimiter_at_cut() {
        // A cut that would land directly after an underscore gets shifted.
        let result = shorten("abcde_fghij_klmno", 12);
        assert_eq!(result.len(), 12);
        assert!(!result.contains("__"));
    }

    #[test]
    fn test_deterministic() {
        let a = shorten("a_very_long_identifier_name_exceeding_limit", 10);
        let b = shorten("a_very_long_identifier_name_exceeding_limit", 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_foreign_key_name_synthesis() {
        let fk = ForeignKey::new("ROUNDTRIP_1").reference("VALUE", "PK");
        let name = foreign_key_name("ROUNDTRIP_2", &fk, 64);
        assert_eq!(name, "ROUNDTRIP_2_VALUE_ROUNDTRIP_1");

        let truncated = foreign_key_name("ROUNDTRIP_2", &fk, 18);
        assert_eq!(truncated.len(), 18);
        assert!(truncated.starts_with("ROUNDTRIP"));
        assert!(truncated.ends_with("_1"));
    }

    #[test]
    fn test_declared_name_kept() {
        let fk = ForeignKey::new("parent").named("fk_custom").reference("a", "b");
        assert_eq!(foreign_key_name("child", &fk, 64), "fk_custom");
    }

    #[test]
    fn test_distinct_keys_stay_distinct_under_truncation() {
        let fk1 = ForeignKey::new("ROUNDTRIP_1").reference("VALUE", "PK");
        let fk2 = ForeignKey::new("ROUNDTRIP_1").reference("OTHER", "PK");
        let n1 = foreign_key_name("ROUNDTRIP_2", &fk1, 24);
        let n2 = foreign_key_name("ROUNDTRIP_2", &fk2, 24);
        assert_ne!(n1, n2);
    }
}
