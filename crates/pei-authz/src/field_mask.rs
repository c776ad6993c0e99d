//! Field-level visibility of sensitive student data.
//!
//! A registered sensitive field is hidden from a role unless a rule makes it
//! visible. Any other field is visible unless a rule hides it.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use pei_models::Role;

use crate::store::FieldRule;

/// Fields that are hidden unless a rule allows them.
pub const SENSITIVE_FIELDS: [&str; 10] = [
    "cpf",
    "rg",
    "health_notes",
    "diagnosis",
    "medications",
    "guardian_contact",
    "guardian_cpf",
    "address",
    "birth_certificate",
    "nis",
];

fn normalize(field: &str) -> String {
    field.trim().to_ascii_lowercase()
}

pub fn is_sensitive(field: &str) -> bool {
    let field = normalize(field);
    SENSITIVE_FIELDS.contains(&field.as_str())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    rules: HashMap<(Role, String), bool>,
}

impl FieldMask {
    /// Builds a mask from store rows. Rows naming an unknown role are skipped.
    pub fn from_rules(rules: impl IntoIterator<Item = FieldRule>) -> Self {
        let mut map = HashMap::new();
        for rule in rules {
            match rule.role.parse::<Role>() {
                Ok(role) => {
                    map.insert((role, normalize(&rule.field)), rule.visible);
                }
                Err(e) => {
                    warn!(role = %rule.role, field = %rule.field, error = %e, "Skipping field rule for unknown role");
                }
            }
        }
        Self { rules: map }
    }

    /// Built-in rules used until the store's table has been loaded.
    pub fn defaults() -> Self {
        use Role::*;

        let identity: &[Role] = &[
            Superadmin,
            EducationSecretary,
            SchoolDirector,
            SchoolManager,
            Secretary,
        ];
        let clinical: &[Role] = &[Superadmin, SchoolDirector, Coordinator, AeeTeacher, Specialist];

        let table: &[(&str, &[Role])] = &[
            ("cpf", identity),
            ("rg", identity),
            ("guardian_cpf", identity),
            ("nis", identity),
            (
                "birth_certificate",
                &[
                    Superadmin,
                    EducationSecretary,
                    SchoolDirector,
                    SchoolManager,
                    Secretary,
                    Coordinator,
                ],
            ),
            (
                "address",
                &[Superadmin, SchoolDirector, SchoolManager, Secretary, Coordinator],
            ),
            (
                "guardian_contact",
                &[
                    Superadmin,
                    SchoolDirector,
                    SchoolManager,
                    Secretary,
                    Coordinator,
                    Teacher,
                    AeeTeacher,
                ],
            ),
            ("health_notes", clinical),
            ("diagnosis", clinical),
            (
                "medications",
                &[
                    Superadmin,
                    SchoolDirector,
                    Coordinator,
                    AeeTeacher,
                    Specialist,
                    Teacher,
                    SupportProfessional,
                ],
            ),
        ];

        let rules = table.iter().flat_map(|(field, roles)| {
            roles
                .iter()
                .map(move |role| FieldRule::new(role.as_str(), *field, true))
        });
        Self::from_rules(rules)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_visible(&self, role: Role, field: &str) -> bool {
        let field = normalize(field);
        match self.rules.get(&(role, field.clone())) {
            Some(visible) => *visible,
            None => !SENSITIVE_FIELDS.contains(&field.as_str()),
        }
    }

    /// Visible if any held role may see the field. Without roles only
    /// non-sensitive fields are visible.
    pub fn visible_for(&self, roles: &BTreeSet<Role>, field: &str) -> bool {
        if roles.is_empty() {
            return !is_sensitive(field);
        }
        roles.iter().any(|role| self.is_visible(*role, field))
    }

    /// Removes every field `roles` may not see, at any depth, and returns the
    /// removed paths (`guardians[0].cpf`).
    pub fn redact(&self, roles: &BTreeSet<Role>, record: &mut Value) -> Vec<String> {
        let mut removed = Vec::new();
        self.redact_at(roles, record, "", &mut removed);
        removed
    }

    fn redact_at(
        &self,
        roles: &BTreeSet<Role>,
        value: &mut Value,
        path: &str,
        removed: &mut Vec<String>,
    ) {
        match value {
            Value::Object(map) => {
                let hidden: Vec<String> = map
                    .keys()
                    .filter(|key| !self.visible_for(roles, key))
                    .cloned()
                    .collect();
                for key in hidden {
                    map.remove(&key);
                    removed.push(join_path(path, &key));
                }
                for (key, child) in map.iter_mut() {
                    self.redact_at(roles, child, &join_path(path, key), removed);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter_mut().enumerate() {
                    self.redact_at(roles, child, &format!("{path}[{index}]"), removed);
                }
            }
            _ => {}
        }
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roles(list: &[Role]) -> BTreeSet<Role> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_non_sensitive_fields_are_visible() {
        let mask = FieldMask::default();
        assert!(mask.is_visible(Role::Teacher, "name"));
        assert!(mask.is_visible(Role::Family, "grade"));
    }

    #[test]
    fn test_sensitive_fields_hidden_without_rule() {
        let mask = FieldMask::default();
        for field in SENSITIVE_FIELDS {
            assert!(!mask.is_visible(Role::SchoolDirector, field));
        }
    }

    #[test]
    fn test_explicit_rules_win() {
        let mask = FieldMask::from_rules([
            FieldRule::new("teacher", "cpf", true),
            FieldRule::new("teacher", "nickname", false),
        ]);
        assert!(mask.is_visible(Role::Teacher, "cpf"));
        assert!(!mask.is_visible(Role::Teacher, "nickname"));
        assert!(!mask.is_visible(Role::AeeTeacher, "cpf"));
    }

    #[test]
    fn test_unknown_role_rows_are_skipped() {
        let mask = FieldMask::from_rules([
            FieldRule::new("janitor", "cpf", true),
            FieldRule::new("secretary", "cpf", true),
        ]);
        assert_eq!(mask.len(), 1);
    }

    #[test]
    fn test_field_names_are_normalized() {
        let mask = FieldMask::from_rules([FieldRule::new("secretary", " CPF ", true)]);
        assert!(mask.is_visible(Role::Secretary, "cpf"));
        assert!(!mask.is_visible(Role::Teacher, "Cpf"));
    }

    #[test]
    fn test_defaults() {
        let mask = FieldMask::defaults();
        assert!(mask.is_visible(Role::Secretary, "cpf"));
        assert!(!mask.is_visible(Role::Teacher, "cpf"));
        assert!(mask.is_visible(Role::AeeTeacher, "diagnosis"));
        assert!(!mask.is_visible(Role::Secretary, "diagnosis"));
        assert!(!mask.is_visible(Role::Family, "health_notes"));
        assert!(mask.is_visible(Role::Teacher, "guardian_contact"));
    }

    #[test]
    fn test_visible_for_any_role() {
        let mask = FieldMask::defaults();
        assert!(mask.visible_for(&roles(&[Role::Teacher, Role::Secretary]), "cpf"));
        assert!(!mask.visible_for(&roles(&[Role::Teacher, Role::Family]), "cpf"));
        assert!(!mask.visible_for(&BTreeSet::new(), "cpf"));
        assert!(mask.visible_for(&BTreeSet::new(), "name"));
    }

    #[test]
    fn test_visibility_is_idempotent() {
        let mask = FieldMask::defaults();
        for role in Role::ALL {
            for field in SENSITIVE_FIELDS {
                assert_eq!(mask.is_visible(role, field), mask.is_visible(role, field));
            }
        }
    }

    #[test]
    fn test_redact_nested() {
        let mask = FieldMask::defaults();
        let mut record = json!({
            "name": "Ana",
            "cpf": "123.456.789-00",
            "diagnosis": "TEA",
            "guardians": [
                { "name": "Maria", "guardian_cpf": "987", "guardian_contact": "555" },
                { "name": "João", "guardian_contact": "556" }
            ],
            "school": { "name": "EM Centro", "address": "Rua 1" }
        });

        let removed = mask.redact(&roles(&[Role::Teacher]), &mut record);

        assert_eq!(
            record,
            json!({
                "name": "Ana",
                "guardians": [
                    { "name": "Maria", "guardian_contact": "555" },
                    { "name": "João", "guardian_contact": "556" }
                ],
                "school": { "name": "EM Centro" }
            })
        );
        let removed: BTreeSet<String> = removed.into_iter().collect();
        let expected: BTreeSet<String> = [
            "cpf",
            "diagnosis",
            "guardians[0].guardian_cpf",
            "school.address",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(removed, expected);
    }

    #[test]
    fn test_redact_keeps_everything_visible() {
        let mask = FieldMask::defaults();
        let mut record = json!({ "name": "Ana", "cpf": "1", "rg": "2" });
        let original = record.clone();

        let removed = mask.redact(&roles(&[Role::Secretary]), &mut record);

        assert!(removed.is_empty());
        assert_eq!(record, original);
    }

    #[test]
    fn test_redact_top_level_array() {
        let mask = FieldMask::default();
        let mut records = json!([{ "nis": "1" }, { "nis": "2", "name": "B" }]);

        let removed = mask.redact(&roles(&[Role::Teacher]), &mut records);

        assert_eq!(removed, vec!["[0].nis", "[1].nis"]);
        assert_eq!(records, json!([{}, { "name": "B" }]));
    }
}
