//! Declarative validation for the create forms.
//!
//! Rules run per field in declaration order and stop at the first failure, so
//! each field reports at most one error. Length and pattern rules skip empty
//! values; pair them with [`FieldRule::Required`] when the field is mandatory.

use std::collections::BTreeMap;

use regex::Regex;

pub const ID_PATTERN: &str = "^[a-zA-Z0-9-]+$";
pub const ID_MAX_LENGTH: usize = 100;
pub const NAME_MAX_LENGTH: usize = 255;
pub const DESCRIPTION_MAX_LENGTH: usize = 512;

#[derive(Debug, Clone)]
pub enum FieldRule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern { regex: Regex, message: String },
    NonEmptyList,
}

impl FieldRule {
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            regex: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    fn check(&self, values: &[String]) -> Option<String> {
        let text = values.first().map(String::as_str).unwrap_or("");
        let length = text.chars().count();
        match self {
            Self::Required if text.trim().is_empty() => Some("is required".to_string()),
            Self::MinLength(min) if !text.is_empty() && length < *min => {
                Some(format!("must be at least {min} characters"))
            }
            Self::MaxLength(max) if length > *max => {
                Some(format!("must be at most {max} characters"))
            }
            Self::Pattern { regex, message } if !text.is_empty() && !regex.is_match(text) => {
                Some(message.clone())
            }
            Self::NonEmptyList if values.iter().all(|value| value.trim().is_empty()) => {
                Some("needs at least one entry".to_string())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(Vec<FieldError>),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }
}

/// Submitted form values. Text fields hold one entry, list fields any number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub type FormRules = Vec<(&'static str, Vec<FieldRule>)>;

pub fn validate(values: &FormValues, rules: &[(&'static str, Vec<FieldRule>)]) -> Validation {
    let errors: Vec<FieldError> = rules
        .iter()
        .filter_map(|(field, field_rules)| {
            let submitted = values.get(field);
            field_rules
                .iter()
                .find_map(|rule| rule.check(submitted))
                .map(|message| FieldError {
                    field: (*field).to_string(),
                    message,
                })
        })
        .collect();

    if errors.is_empty() {
        Validation::Valid
    } else {
        Validation::Invalid(errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Feature,
    Goal,
    Segment,
}

impl FormKind {
    pub const ALL: [Self; 3] = [Self::Feature, Self::Goal, Self::Segment];

    pub fn name(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Goal => "goal",
            Self::Segment => "segment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn rules(self) -> Result<FormRules, regex::Error> {
        let id_rules = || -> Result<Vec<FieldRule>, regex::Error> {
            Ok(vec![
                FieldRule::Required,
                FieldRule::pattern(
                    ID_PATTERN,
                    "may only contain letters, digits and hyphens",
                )?,
                FieldRule::MaxLength(ID_MAX_LENGTH),
            ])
        };
        let name_rules = || vec![FieldRule::Required, FieldRule::MaxLength(NAME_MAX_LENGTH)];
        let description_rules = || vec![FieldRule::MaxLength(DESCRIPTION_MAX_LENGTH)];

        Ok(match self {
            Self::Feature => vec![
                ("id", id_rules()?),
                ("name", name_rules()),
                ("description", description_rules()),
                ("tags", vec![FieldRule::NonEmptyList]),
            ],
            Self::Goal => vec![
                ("id", id_rules()?),
                ("name", name_rules()),
                ("description", description_rules()),
            ],
            Self::Segment => vec![
                ("name", name_rules()),
                ("description", description_rules()),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feature_rules() -> FormRules {
        FormKind::Feature.rules().expect("built-in patterns compile")
    }

    #[test]
    fn valid_feature_passes() {
        let values = FormValues::new()
            .with("id", "new-checkout-2")
            .with("name", "New checkout")
            .with("tags", "web");
        assert_eq!(validate(&values, &feature_rules()), Validation::Valid);
    }

    #[test]
    fn empty_feature_reports_each_field_once() {
        let result = validate(&FormValues::new(), &feature_rules());
        let fields: Vec<&str> = result.errors().iter().map(|err| err.field.as_str()).collect();
        assert_eq!(fields, vec!["id", "name", "tags"]);
        assert_eq!(result.errors()[0].message, "is required");
    }

    #[test]
    fn id_pattern_and_name_length_are_enforced() {
        let values = FormValues::new()
            .with("id", "has space")
            .with("name", "x".repeat(NAME_MAX_LENGTH + 1))
            .with("tags", "web");
        let result = validate(&values, &feature_rules());
        assert_eq!(
            result,
            Validation::Invalid(vec![
                FieldError {
                    field: "id".to_string(),
                    message: "may only contain letters, digits and hyphens".to_string(),
                },
                FieldError {
                    field: "name".to_string(),
                    message: "must be at most 255 characters".to_string(),
                },
            ])
        );
    }

    #[test]
    fn blank_tags_do_not_count() {
        let values = FormValues::new()
            .with("id", "a")
            .with("name", "A")
            .with("tags", "  ");
        let result = validate(&values, &feature_rules());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].to_string(), "tags needs at least one entry");
    }

    #[test]
    fn min_length_skips_empty_values() {
        let rules = vec![("code", vec![FieldRule::MinLength(3)])];
        assert!(validate(&FormValues::new(), &rules).is_valid());
        assert!(!validate(&FormValues::new().with("code", "ab"), &rules).is_valid());
    }

    #[test]
    fn segment_has_no_id() {
        let rules = FormKind::Segment.rules().expect("rules");
        assert!(validate(&FormValues::new().with("name", "beta users"), &rules).is_valid());
        assert_eq!(FormKind::from_name("segment"), Some(FormKind::Segment));
        assert_eq!(FormKind::from_name("flag"), None);
    }
}
