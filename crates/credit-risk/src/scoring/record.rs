use super::value::FieldValue;
use crate::normalizer::normalize_field_name;
use serde::Serialize;

/// One customer row keyed by normalized column name, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerRecord {
    fields: Vec<(String, FieldValue)>,
}

impl CustomerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; the name is normalized first.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value.into());
        self
    }

    /// Replaces the value of an existing column or appends a new one.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        let name = normalize_field_name(name);
        match self.fields.iter_mut().find(|(column, _)| *column == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Looks up an already-normalized column.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub(crate) fn get_mut(&mut self, column: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, FieldValue)> for CustomerRecord {
    fn from_iter<I: IntoIterator<Item = (S, FieldValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.set(name.as_ref(), value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_normalizes_names_and_replaces_existing_values() {
        let mut record = CustomerRecord::new()
            .with("Credit amount", 1200)
            .with("Purpose", "car");
        record.set("credit amount", FieldValue::from(900));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("credit_amount"), Some(&FieldValue::Number(900.0)));
        assert_eq!(
            record.columns().collect::<Vec<_>>(),
            vec!["credit_amount", "purpose"]
        );
    }
}
