use serde::Serialize;

/// A synthesized contact: one display name, one phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    display_name: String,
    phone: String,
}

impl ContactRecord {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

/// Builds one record per number, named `{base_name}-{n}` with `n` starting at 1.
/// Phone values are whitespace-trimmed and otherwise kept as found.
pub fn build_contacts<S: AsRef<str>>(base_name: &str, numbers: &[S]) -> Vec<ContactRecord> {
    numbers
        .iter()
        .enumerate()
        .map(|(index, number)| ContactRecord {
            display_name: format!("{base_name}-{}", index + 1),
            phone: number.as_ref().trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::build_contacts;

    #[test]
    fn build_contacts_numbers_from_one() {
        let contacts = build_contacts("alice", &["555-123-4567", "555.987.6543"]);
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].display_name(), "alice-1");
        assert_eq!(contacts[0].phone(), "555-123-4567");
        assert_eq!(contacts[1].display_name(), "alice-2");
        assert_eq!(contacts[1].phone(), "555.987.6543");
    }

    #[test]
    fn build_contacts_trims_surrounding_whitespace() {
        let contacts = build_contacts("bob", &[" 555 0101\n".to_string()]);
        assert_eq!(contacts[0].phone(), "555 0101");
    }

    #[test]
    fn build_contacts_suffixes_strictly_increase() {
        let numbers: Vec<String> = (0..12).map(|n| format!("555-01{n:02}")).collect();
        let contacts = build_contacts("team", &numbers);
        assert_eq!(contacts.len(), numbers.len());
        for (index, contact) in contacts.iter().enumerate() {
            assert_eq!(contact.display_name(), format!("team-{}", index + 1));
        }
    }

    #[test]
    fn build_contacts_empty_input() {
        let none: [&str; 0] = [];
        assert!(build_contacts("empty", &none).is_empty());
    }
}
