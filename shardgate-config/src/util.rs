/// Normalize a plugin type name so "ROUND_ROBIN", "round-robin"
/// and "RoundRobin" all resolve to the same entry.
pub fn normalize_type(name: &str) -> String {
    name.to_lowercase().replace(['_', '-', '.'], "")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type("ROUND_ROBIN"), "roundrobin");
        assert_eq!(normalize_type("round-robin"), "roundrobin");
        assert_eq!(normalize_type("HASH_MOD"), normalize_type("hash-mod"));
    }
}
