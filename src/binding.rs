//! Explicit setter registry used to push a record's written fields onto a
//! widget. Each widget type registers typed setters ahead of time; fields
//! without a setter are skipped.

use std::collections::HashMap;

use crate::record::{EntityRecord, Field, FieldValue};

type Setter<W> = Box<dyn Fn(&mut W, &FieldValue<'_>)>;

pub struct FieldBindings<W> {
    setters: HashMap<Field, Setter<W>>,
}

impl<W> Default for FieldBindings<W> {
    fn default() -> Self {
        Self {
            setters: HashMap::new(),
        }
    }
}

impl<W> FieldBindings<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `setter` for `field`, replacing any previous one.
    pub fn bind<F>(mut self, field: Field, setter: F) -> Self
    where
        F: Fn(&mut W, &FieldValue<'_>) + 'static,
    {
        self.setters.insert(field, Box::new(setter));
        self
    }

    /// Register by stable key (`"text"`, `"font_size"`, ...). Unknown keys
    /// are rejected with `None`.
    pub fn bind_key<F>(self, key: &str, setter: F) -> Option<Self>
    where
        F: Fn(&mut W, &FieldValue<'_>) + 'static,
    {
        let field = Field::from_key(key)?;
        Some(self.bind(field, setter))
    }

    pub fn is_bound(&self, field: Field) -> bool {
        self.setters.contains_key(&field)
    }

    /// Apply every written field that has a setter. Returns the count applied.
    pub fn apply(&self, widget: &mut W, record: &EntityRecord) -> usize {
        let mut applied = 0;
        for (field, value) in record.fields() {
            if let Some(setter) = self.setters.get(&field) {
                setter(widget, &value);
                applied += 1;
            } else {
                tracing::trace!("No binding for {} on record {}", field.key(), record.id);
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Alignment, Reverse};
    use glam::Vec2;

    #[derive(Default)]
    struct Label {
        text: String,
        size: f32,
        centered: bool,
        right_to_left: bool,
        pivot: Vec2,
    }

    fn label_bindings() -> FieldBindings<Label> {
        FieldBindings::new()
            .bind(Field::Text, |w: &mut Label, v| {
                if let FieldValue::Text(t) = v {
                    w.text = t.to_string();
                }
            })
            .bind(Field::FontSize, |w: &mut Label, v| {
                if let FieldValue::Number(n) = v {
                    w.size = *n;
                }
            })
            .bind(Field::Alignment, |w: &mut Label, v| {
                w.centered = matches!(v, FieldValue::Alignment(Alignment::Center));
            })
            .bind(Field::Reverse, |w: &mut Label, v| {
                if let FieldValue::Reverse(r) = v {
                    w.right_to_left = r.as_bool().unwrap_or(w.right_to_left);
                }
            })
    }

    #[test]
    fn apply_sets_bound_written_fields() {
        let mut record = EntityRecord::new(1.0, 1).with_text("Olá");
        record.font_size = Some(18.0);
        record.alignment = Some(Alignment::Center);
        record.reverse = Some(Reverse::True);
        record.pivot = Some(Vec2::new(0.5, 0.5));

        let mut label = Label::default();
        assert_eq!(label_bindings().apply(&mut label, &record), 4);
        assert_eq!(label.text, "Olá");
        assert_eq!(label.size, 18.0);
        assert!(label.centered);
        assert!(label.right_to_left);
        assert_eq!(label.pivot, Vec2::ZERO);
    }

    #[test]
    fn unwritten_fields_leave_widget_alone() {
        let mut label = Label {
            text: "keep".into(),
            ..Default::default()
        };
        let record = EntityRecord::new(2.0, 0);
        assert_eq!(label_bindings().apply(&mut label, &record), 0);
        assert_eq!(label.text, "keep");
    }

    #[test]
    fn bind_by_key() {
        let bindings = FieldBindings::<Label>::new()
            .bind_key("pivot", |w, v| {
                if let FieldValue::Vec2(p) = v {
                    w.pivot = *p;
                }
            })
            .unwrap();
        assert!(bindings.is_bound(Field::Pivot));
        assert!(FieldBindings::<Label>::new().bind_key("colour", |_, _| {}).is_none());
    }
}
