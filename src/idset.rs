//! Comma-joined id sets, the legacy wire format for task/quiz assignment.
//! Storage uses join tables; this only parses the inbound string.

/// Split a comma-joined id list into trimmed, de-duplicated ids.
/// Order is preserved; empty segments are dropped.
pub fn parse_id_set(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in s.split(',') {
        let id = part.trim();
        if id.is_empty() {
            continue;
        }
        if !out.iter().any(|existing| existing == id) {
            out.push(id.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::parse_id_set;

    #[test]
    fn splits_and_trims() {
        assert_eq!(parse_id_set("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn drops_empties_and_duplicates() {
        assert_eq!(parse_id_set(",a,,a , b,"), vec!["a", "b"]);
        assert!(parse_id_set("").is_empty());
        assert!(parse_id_set(" , ,").is_empty());
    }
}
