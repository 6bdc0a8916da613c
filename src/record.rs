//! Records stored in a language file: one localizable element per entity,
//! shared text per group, free annotations per comment.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Horizontal text alignment. The vertical part is tracked elsewhere and
/// never written to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Start,
    Center,
    End,
}

impl Alignment {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Alignment::Start),
            2 => Some(Alignment::Center),
            3 => Some(Alignment::End),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Alignment::Start => 1,
            Alignment::Center => 2,
            Alignment::End => 3,
        }
    }
}

/// Whether the character order of the text is reversed (right-to-left scripts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reverse {
    #[default]
    Unset,
    False,
    True,
}

impl Reverse {
    /// Unknown codes collapse to `Unset`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Reverse::False,
            2 => Reverse::True,
            _ => Reverse::Unset,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Reverse::Unset => 0,
            Reverse::False => 1,
            Reverse::True => 2,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Reverse::Unset => None,
            Reverse::False => Some(false),
            Reverse::True => Some(true),
        }
    }
}

/// Override data for one localizable element.
///
/// Every optional field is `None` when it was not written; the codec only
/// emits (and only restores) the fields that are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRecord {
    pub id: f32,
    /// Selects which fields are meaningful for the element (text only,
    /// rect only, rect and text, 3D text, group member, ...). 0 is the
    /// generic type.
    pub component_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Index into the configured font list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_scale: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_min: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_max: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchored_position: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_delta: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<Reverse>,
}

impl EntityRecord {
    pub fn new(id: f32, component_type: i32) -> Self {
        Self {
            id,
            component_type,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Written fields in the order they appear on the line.
    pub fn fields(&self) -> Vec<(Field, FieldValue<'_>)> {
        let mut out = Vec::new();
        if let Some(text) = &self.text {
            out.push((Field::Text, FieldValue::Text(text)));
        }
        if let Some(size) = self.font_size {
            out.push((Field::FontSize, FieldValue::Number(size)));
        }
        if let Some(font) = self.font {
            out.push((Field::Font, FieldValue::Index(font)));
        }
        if let Some(q) = self.rotation {
            out.push((Field::Rotation, FieldValue::Quat(q)));
        }
        if let Some(v) = self.local_scale {
            out.push((Field::LocalScale, FieldValue::Vec3(v)));
        }
        let rect = [
            (Field::AnchorMin, self.anchor_min),
            (Field::AnchorMax, self.anchor_max),
            (Field::AnchoredPosition, self.anchored_position),
            (Field::SizeDelta, self.size_delta),
            (Field::Pivot, self.pivot),
        ];
        for (field, value) in rect {
            if let Some(v) = value {
                out.push((field, FieldValue::Vec2(v)));
            }
        }
        if let Some(a) = self.alignment {
            out.push((Field::Alignment, FieldValue::Alignment(a)));
        }
        if let Some(r) = self.reverse {
            out.push((Field::Reverse, FieldValue::Reverse(r)));
        }
        out
    }
}

/// Optional fields of an [`EntityRecord`], keyed by a stable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Text,
    FontSize,
    Font,
    Rotation,
    LocalScale,
    AnchorMin,
    AnchorMax,
    AnchoredPosition,
    SizeDelta,
    Pivot,
    Alignment,
    Reverse,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Text,
        Field::FontSize,
        Field::Font,
        Field::Rotation,
        Field::LocalScale,
        Field::AnchorMin,
        Field::AnchorMax,
        Field::AnchoredPosition,
        Field::SizeDelta,
        Field::Pivot,
        Field::Alignment,
        Field::Reverse,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Text => "text",
            Field::FontSize => "font_size",
            Field::Font => "font",
            Field::Rotation => "rotation",
            Field::LocalScale => "local_scale",
            Field::AnchorMin => "anchor_min",
            Field::AnchorMax => "anchor_max",
            Field::AnchoredPosition => "anchored_position",
            Field::SizeDelta => "size_delta",
            Field::Pivot => "pivot",
            Field::Alignment => "alignment",
            Field::Reverse => "reverse",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f32),
    Index(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Quat(Quat),
    Alignment(Alignment),
    Reverse(Reverse),
}

/// Shared text displayed by every member entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub text_id: f32,
    /// Member entity ids, kept verbatim.
    pub member_ids: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment_id: f32,
    pub text: String,
}
