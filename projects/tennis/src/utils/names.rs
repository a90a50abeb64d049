//! Player-name reconciliation across feeds.
//!
//! The odds feed writes `"Djokovic, Novak"`, the stats feed `"Novak Djokovic"`
//! and the ATP feed sometimes hyphenates or abbreviates. Two keys are used:
//! [`normalize_player_name`] for exact lookups and [`compact_name`] for the
//! looser matching done by [`NameIndex`].

/// Lowercases, turns `"Last, First"` into `"first last"`, drops anything that
/// is neither alphanumeric nor whitespace and collapses runs of whitespace.
pub fn normalize_player_name(name: &str) -> String {
    let lowered = name.to_lowercase();

    let ordered = match lowered.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim()),
        None => lowered,
    };

    let kept: String = ordered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase with spaces, hyphens and dots removed.
pub fn compact_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.'))
        .collect()
}

/// Display names keyed by [`compact_name`], in insertion order.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: Vec<(String, String)>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// A later name with the same key replaces the earlier one in place.
    pub fn insert(&mut self, display_name: &str) {
        let key = compact_name(display_name);
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = display_name.to_string(),
            None => self.entries.push((key, display_name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key first, then the first entry whose key contains the search
    /// key or is contained in it.
    pub fn resolve(&self, raw_name: &str) -> Option<&str> {
        let search = compact_name(raw_name.trim());
        if search.is_empty() {
            return None;
        }

        if let Some((_, name)) = self.entries.iter().find(|(key, _)| *key == search) {
            return Some(name);
        }

        self.entries
            .iter()
            .find(|(key, _)| key.contains(&search) || search.contains(key.as_str()))
            .map(|(_, name)| name.as_str())
    }
}

impl<'a> FromIterator<&'a str> for NameIndex {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut index = NameIndex::new();
        for name in iter {
            index.insert(name);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reorders_comma_names() {
        assert_eq!(normalize_player_name("Djokovic, Novak"), "novak djokovic");
        assert_eq!(normalize_player_name("Novak Djokovic"), "novak djokovic");
        assert_eq!(normalize_player_name("Alcaraz,Carlos"), "carlos alcaraz");
    }

    #[test]
    fn test_normalize_strips_punctuation_and_whitespace() {
        assert_eq!(normalize_player_name("  Felix   Auger-Aliassime "), "felix augeraliassime");
        assert_eq!(normalize_player_name("J.J. Wolf"), "jj wolf");
        assert_eq!(normalize_player_name("Cerúndolo, Francisco"), "francisco cerúndolo");
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize_player_name(""), "");
        assert_eq!(normalize_player_name(" , "), "");
    }

    #[test]
    fn test_compact_name() {
        assert_eq!(compact_name("Felix Auger-Aliassime"), "felixaugeraliassime");
        assert_eq!(compact_name("J.J. Wolf"), "jjwolf");
    }

    #[test]
    fn test_resolve_prefers_exact_match() {
        let index: NameIndex = ["Alexander Zverev", "Mischa Zverev"].into_iter().collect();
        assert_eq!(index.resolve("Mischa Zverev"), Some("Mischa Zverev"));
        assert_eq!(index.resolve("alexander-zverev"), Some("Alexander Zverev"));
    }

    #[test]
    fn test_resolve_falls_back_to_substring_either_way() {
        let index: NameIndex = ["Felix Auger-Aliassime", "Jannik Sinner"].into_iter().collect();
        assert_eq!(index.resolve("Auger-Aliassime"), Some("Felix Auger-Aliassime"));
        assert_eq!(index.resolve("Dr. Jannik Sinner Jr"), Some("Jannik Sinner"));
        assert_eq!(index.resolve("Carlos Alcaraz"), None);
    }

    #[test]
    fn test_resolve_ignores_blank_search() {
        let index: NameIndex = ["Jannik Sinner"].into_iter().collect();
        assert_eq!(index.resolve("   "), None);
    }

    #[test]
    fn test_insert_same_key_replaces_in_place() {
        let mut index = NameIndex::new();
        index.insert("Jan-Lennard Struff");
        index.insert("Casper Ruud");
        index.insert("Jan Lennard Struff");
        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("janlennardstruff"), Some("Jan Lennard Struff"));
    }
}
