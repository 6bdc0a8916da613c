use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};

use crate::codec::{
    decode_comment, decode_entity, decode_group, encode_comment, encode_entity, encode_group,
    COMMENT_PREFIX, ENTITY_PREFIX, GROUP_PREFIX,
};
use crate::error::{Error, Result};
use crate::record::{CommentRecord, EntityRecord, GroupRecord};

const LABEL_PREFIX: &str = "Linguagem - [";

/// A whole language file: two header lines followed by entity, group and
/// comment lines, each recognised by its prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageFile {
    /// `Linguagem - [<DISPLAY NAME>]`
    pub language_label: String,
    /// Human-readable locale, e.g. `English (United States)`.
    pub culture_name: String,
    pub entities: Vec<EntityRecord>,
    pub groups: Vec<GroupRecord>,
    pub comments: Vec<CommentRecord>,
}

/// Decode file bytes, honouring a UTF-8/UTF-16 byte-order mark. Without one
/// the data is read as UTF-8.
pub fn decode_text(data: &[u8]) -> String {
    let encoding = Encoding::for_bom(data).map_or(UTF_8, |(enc, _)| enc);
    let (cow, _, had_errors) = encoding.decode(data);
    if had_errors {
        tracing::warn!("Replaced invalid {} sequences while decoding", encoding.name());
    }
    cow.into_owned()
}

impl LanguageFile {
    pub fn new(display_name: &str, culture_name: &str) -> Self {
        LanguageFile {
            language_label: format!("{}{}]", LABEL_PREFIX, display_name),
            culture_name: culture_name.to_string(),
            ..Default::default()
        }
    }

    /// The name inside the label's brackets, or the whole label when it is
    /// not in the usual form.
    pub fn display_name(&self) -> &str {
        self.language_label
            .strip_prefix(LABEL_PREFIX)
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(&self.language_label)
    }

    pub fn open(data: &[u8]) -> Self {
        Self::parse(&decode_text(data))
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::MissingFile {
                path: path.to_path_buf(),
            },
            _ => Error::Io(e),
        })?;
        Ok(Self::open(&data))
    }

    /// Parse file text. Lines are dispatched by prefix; lines with an
    /// unknown prefix and malformed records are skipped.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.lines();
        let mut file = LanguageFile {
            language_label: lines.next().unwrap_or_default().to_string(),
            culture_name: lines.next().unwrap_or_default().to_string(),
            ..Default::default()
        };

        for (index, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = index + 3;
            let parsed = if line.starts_with(ENTITY_PREFIX) {
                decode_entity(line).map(|e| file.entities.push(e))
            } else if line.starts_with(GROUP_PREFIX) {
                decode_group(line).map(|g| file.groups.push(g))
            } else if line.starts_with(COMMENT_PREFIX) {
                decode_comment(line).map(|c| file.comments.push(c))
            } else {
                tracing::debug!("Skipping unrecognized line {}: {:?}", line_no, line);
                continue;
            };
            if let Err(e) = parsed {
                tracing::warn!("Skipping line {}: {}", line_no, e);
            }
        }

        tracing::debug!(
            "Parsed {}: {} entities, {} groups, {} comments",
            file.display_name(),
            file.entities.len(),
            file.groups.len(),
            file.comments.len()
        );
        file
    }

    /// Serialize to file text. Records are written in their current order;
    /// call [`LanguageFile::sort_by_id`] first for a canonical file.
    pub fn to_text(&self) -> String {
        self.warn_duplicates();

        let mut out = String::new();
        out.push_str(&self.language_label);
        out.push('\n');
        out.push_str(&self.culture_name);
        out.push('\n');
        for entity in &self.entities {
            out.push_str(&encode_entity(entity));
            out.push('\n');
        }
        for group in &self.groups {
            out.push_str(&encode_group(group));
            out.push('\n');
        }
        for comment in &self.comments {
            out.push_str(&encode_comment(comment));
            out.push('\n');
        }
        out
    }

    /// UTF-8 bytes without a byte-order mark.
    pub fn save(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.save())?;
        Ok(())
    }

    /// Stable ascending sort of each record list by its numeric id.
    pub fn sort_by_id(&mut self) {
        self.entities.sort_by(|a, b| a.id.total_cmp(&b.id));
        self.groups.sort_by(|a, b| a.text_id.total_cmp(&b.text_id));
        self.comments.sort_by(|a, b| a.comment_id.total_cmp(&b.comment_id));
    }

    /// Entity ids that occur more than once, ascending.
    pub fn duplicate_entity_ids(&self) -> Vec<f32> {
        let mut ids: Vec<f32> = self.entities.iter().map(|e| e.id).collect();
        ids.sort_by(f32::total_cmp);
        let mut dups: Vec<f32> = ids
            .windows(2)
            .filter(|pair| pair[0] == pair[1])
            .map(|pair| pair[0])
            .collect();
        dups.dedup();
        dups
    }

    fn warn_duplicates(&self) {
        let dups = self.duplicate_entity_ids();
        if !dups.is_empty() {
            tracing::warn!(
                "{} has duplicate entity ids {:?}; lookups will use the first occurrence",
                self.display_name(),
                dups
            );
        }
    }

    /// Extract all text fields as a list of TextEntry for JSON export
    pub fn extract_texts(&self) -> Vec<TextEntry> {
        let entities = self.entities.iter().filter_map(|e| {
            e.text.as_ref().map(|text| TextEntry {
                kind: TextKind::Entity,
                id: e.id,
                value: text.clone(),
            })
        });
        let groups = self.groups.iter().map(|g| TextEntry {
            kind: TextKind::Group,
            id: g.text_id,
            value: g.text.clone(),
        });
        let comments = self.comments.iter().map(|c| TextEntry {
            kind: TextKind::Comment,
            id: c.comment_id,
            value: c.text.clone(),
        });
        entities.chain(groups).chain(comments).collect()
    }

    /// Update text fields from a list of TextEntry (from JSON import). Each
    /// entry updates the first record of its kind with the same id. An
    /// empty entity value removes that entity's text. Returns how many
    /// records changed.
    pub fn update_texts(&mut self, texts: &[TextEntry]) -> usize {
        let mut updated = 0;
        for te in texts {
            let slot = match te.kind {
                TextKind::Entity => self.entities.iter_mut().find(|e| e.id == te.id).map(|e| {
                    e.text = (!te.value.is_empty()).then(|| te.value.clone());
                }),
                TextKind::Group => self
                    .groups
                    .iter_mut()
                    .find(|g| g.text_id == te.id)
                    .map(|g| g.text = te.value.clone()),
                TextKind::Comment => self
                    .comments
                    .iter_mut()
                    .find(|c| c.comment_id == te.id)
                    .map(|c| c.text = te.value.clone()),
            };
            match slot {
                Some(()) => updated += 1,
                None => tracing::warn!("No {:?} record with id {}; entry ignored", te.kind, te.id),
            }
        }
        updated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    Entity,
    Group,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntry {
    pub kind: TextKind,
    pub id: f32,
    pub value: String,
}
