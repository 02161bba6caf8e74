use std::collections::HashMap;

/// Case-insensitive name lookup that remembers the original spelling.
///
/// First spelling wins when two names differ only in case.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveSet {
    map: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for name in names {
            let name = name.as_ref();
            let key = name.to_uppercase();
            map.entry(key).or_insert_with(|| name.to_string());
        }
        Self { map }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map
            .get(&name.to_uppercase())
            .map(|value| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_keeps_original() {
        let set = CaseInsensitiveSet::new(["SubmitDate", "Fy"]);
        assert_eq!(set.get("SUBMITDATE"), Some("SubmitDate"));
        assert!(set.contains("fy"));
        assert!(!set.contains("PostalCode"));
    }
}
