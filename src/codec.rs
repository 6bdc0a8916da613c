//! Line codec for entity, group and comment records.
//!
//! Entity lines look like `id:5; {Hello} S:12; Ali:2; CType:1;`. Free text
//! sits between the first `{` and the first `}` after it and may contain `;`,
//! so text is always located (and stripped) before any tag is searched.

use std::borrow::Cow;
use std::fmt::Display;

use glam::{Quat, Vec2, Vec3};

use crate::error::{Error, Result};
use crate::record::{Alignment, CommentRecord, EntityRecord, GroupRecord, Reverse};

pub const ENTITY_PREFIX: &str = "id:";
pub const GROUP_PREFIX: &str = "[Text:";
pub const COMMENT_PREFIX: &str = "[Comments:";
const GROUP_MEMBERS_TAG: &str = "ids:";

pub const FONT_SIZE_TAG: &str = "S:";
pub const FONT_TAG: &str = "Font:";
pub const ROTATION_TAGS: [&str; 4] = ["XRotation:", "YRotation:", "ZRotation:", "WRotation:"];
pub const SCALE_TAGS: [&str; 3] = ["XScale:", "YScale:", "ZScale:"];
pub const ANCHOR_MIN_TAGS: [&str; 2] = ["XAnchorMin:", "YAnchorMin:"];
pub const ANCHOR_MAX_TAGS: [&str; 2] = ["XAnchorMax:", "YAnchorMax:"];
pub const POSITION_TAGS: [&str; 2] = ["X:", "Y:"];
pub const SIZE_TAGS: [&str; 2] = ["Width:", "Height:"];
pub const PIVOT_TAGS: [&str; 2] = ["XPivot:", "YPivot:"];
pub const ALIGNMENT_TAG: &str = "Ali:";
pub const REVERSE_TAG: &str = "Rev:";
pub const COMPONENT_TYPE_TAG: &str = "CType:";

/// Byte range of the first `{` and the first `}` after it.
fn braced_span(line: &str) -> Option<(usize, usize)> {
    let open = line.find('{')?;
    let close = line[open + 1..].find('}')? + open + 1;
    Some((open, close))
}

/// Text between the first `{` and the first `}` following it. Braces do not
/// nest: `{a {b} c}` yields `a {b`.
pub fn extract_braced_text(line: &str) -> &str {
    match braced_span(line) {
        Some((open, close)) => &line[open + 1..close],
        None => "",
    }
}

/// The line with its `{...}` span removed.
pub fn strip_braced_text(line: &str) -> Cow<'_, str> {
    match braced_span(line) {
        Some((open, close)) => {
            let mut out = String::with_capacity(line.len() - (close - open + 1));
            out.push_str(&line[..open]);
            out.push_str(&line[close + 1..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(line),
    }
}

/// The numeric run following `tag`, where `tag` includes its colon.
///
/// A tag only matches at the start of the line or after a separator, so
/// `X:` is never found inside `XPivot:`-like neighbours.
fn tag_value<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    for (pos, _) in line.match_indices(tag) {
        let at_boundary = line[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| matches!(c, ' ' | ';' | '['));
        if !at_boundary {
            continue;
        }
        let rest = line[pos + tag.len()..].trim_start();
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
            .unwrap_or(rest.len());
        return Some(&rest[..end]);
    }
    None
}

pub fn find_float_tag(line: &str, tag: &str) -> Option<f32> {
    tag_value(line, tag)?.parse().ok()
}

pub fn find_int_tag(line: &str, tag: &str) -> Option<i32> {
    let raw = tag_value(line, tag)?;
    raw.parse::<i32>()
        .ok()
        .or_else(|| raw.parse::<f32>().ok().map(|v| v as i32))
}

/// Integer value of `tag`, or 0 when absent or unparseable.
pub fn extract_int_tag(line: &str, tag: &str) -> i32 {
    find_int_tag(line, tag).unwrap_or(0)
}

fn parse_id(raw: &str) -> Result<f32> {
    raw.trim().parse().map_err(|_| Error::MalformedId {
        value: raw.trim().to_string(),
    })
}

/// Id of an entity line, without decoding the rest of it.
pub fn entity_id(line: &str) -> Result<f32> {
    let rest = line.strip_prefix(ENTITY_PREFIX).ok_or_else(|| Error::Parse {
        expected: "entity",
        line: line.to_string(),
    })?;
    parse_id(rest.split(';').next().unwrap_or(""))
}

fn push_tag(line: &mut String, tag: &str, value: impl Display) {
    line.push_str(tag);
    line.push_str(&value.to_string());
    line.push_str("; ");
}

pub fn encode_entity(record: &EntityRecord) -> String {
    let mut line = String::new();
    push_tag(&mut line, ENTITY_PREFIX, record.id);

    if let Some(text) = &record.text {
        line.push('{');
        line.push_str(text);
        line.push_str("} ");
    }
    if let Some(size) = record.font_size {
        push_tag(&mut line, FONT_SIZE_TAG, format!("{size:.0}"));
    }
    if let Some(font) = record.font {
        push_tag(&mut line, FONT_TAG, font);
    }
    if let Some(q) = record.rotation {
        for (tag, v) in ROTATION_TAGS.iter().zip([q.x, q.y, q.z, q.w]) {
            push_tag(&mut line, tag, v);
        }
    }
    if let Some(s) = record.local_scale {
        for (tag, v) in SCALE_TAGS.iter().zip(s.to_array()) {
            push_tag(&mut line, tag, v);
        }
    }
    let pairs = [
        (ANCHOR_MIN_TAGS, record.anchor_min),
        (ANCHOR_MAX_TAGS, record.anchor_max),
        (POSITION_TAGS, record.anchored_position),
        (SIZE_TAGS, record.size_delta),
        (PIVOT_TAGS, record.pivot),
    ];
    for (tags, value) in pairs {
        if let Some(v) = value {
            push_tag(&mut line, tags[0], v.x);
            push_tag(&mut line, tags[1], v.y);
        }
    }
    if let Some(a) = record.alignment {
        push_tag(&mut line, ALIGNMENT_TAG, a.code());
    }
    if let Some(r) = record.reverse {
        push_tag(&mut line, REVERSE_TAG, r.code());
    }

    line.push_str(COMPONENT_TYPE_TAG);
    line.push_str(&record.component_type.to_string());
    line.push(';');
    line
}

/// Components present on the line; absent components default to zero.
/// `None` when none of the tags are present.
fn float_group<const N: usize>(line: &str, tags: [&str; N]) -> Option<[f32; N]> {
    let values = tags.map(|tag| find_float_tag(line, tag));
    if values.iter().all(Option::is_none) {
        return None;
    }
    Some(values.map(|v| v.unwrap_or(0.0)))
}

pub fn decode_entity(line: &str) -> Result<EntityRecord> {
    let id = entity_id(line)?;
    let text = braced_span(line).map(|(open, close)| line[open + 1..close].to_string());
    let tags = strip_braced_text(line);
    let tags: &str = &tags;

    let alignment = find_int_tag(tags, ALIGNMENT_TAG).and_then(|code| {
        let alignment = Alignment::from_code(code);
        if alignment.is_none() {
            tracing::warn!("Ignoring unknown alignment code {} on record {}", code, id);
        }
        alignment
    });

    Ok(EntityRecord {
        id,
        component_type: extract_int_tag(tags, COMPONENT_TYPE_TAG),
        text,
        font_size: find_float_tag(tags, FONT_SIZE_TAG),
        font: find_int_tag(tags, FONT_TAG),
        rotation: float_group(tags, ROTATION_TAGS).map(Quat::from_array),
        local_scale: float_group(tags, SCALE_TAGS).map(Vec3::from_array),
        anchor_min: float_group(tags, ANCHOR_MIN_TAGS).map(Vec2::from_array),
        anchor_max: float_group(tags, ANCHOR_MAX_TAGS).map(Vec2::from_array),
        anchored_position: float_group(tags, POSITION_TAGS).map(Vec2::from_array),
        size_delta: float_group(tags, SIZE_TAGS).map(Vec2::from_array),
        pivot: float_group(tags, PIVOT_TAGS).map(Vec2::from_array),
        alignment,
        reverse: find_int_tag(tags, REVERSE_TAG).map(Reverse::from_code),
    })
}

/// Strips the `[`...`]` wrapper of a group or comment line and returns the
/// body after `prefix` (prefix given without its leading `[`).
fn bracketed_body<'a>(line: &'a str, prefix: &str, expected: &'static str) -> Result<&'a str> {
    line.strip_prefix('[')
        .and_then(|inner| inner.strip_prefix(prefix))
        .map(|body| body.strip_suffix(']').unwrap_or(body))
        .ok_or_else(|| Error::Parse {
            expected,
            line: line.to_string(),
        })
}

pub fn encode_group(group: &GroupRecord) -> String {
    format!(
        "{}{}; {{{}}} {}{}]",
        GROUP_PREFIX, group.text_id, group.text, GROUP_MEMBERS_TAG, group.member_ids
    )
}

pub fn decode_group(line: &str) -> Result<GroupRecord> {
    let body = bracketed_body(line, &GROUP_PREFIX[1..], "group")?;
    let text_id = parse_id(body.split(';').next().unwrap_or(""))?;
    let text = extract_braced_text(body).to_string();

    let rest = strip_braced_text(body);
    let member_ids = rest
        .match_indices(GROUP_MEMBERS_TAG)
        .find(|(pos, _)| rest[..*pos].ends_with(&[' ', ';'][..]))
        .map(|(pos, tag)| rest[pos + tag.len()..].to_string())
        .unwrap_or_default();

    Ok(GroupRecord {
        text_id,
        member_ids,
        text,
    })
}

pub fn encode_comment(comment: &CommentRecord) -> String {
    format!("{}{}; {{{}}}]", COMMENT_PREFIX, comment.comment_id, comment.text)
}

pub fn decode_comment(line: &str) -> Result<CommentRecord> {
    let body = bracketed_body(line, &COMMENT_PREFIX[1..], "comment")?;
    Ok(CommentRecord {
        comment_id: parse_id(body.split(';').next().unwrap_or(""))?,
        text: extract_braced_text(body).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_with_semicolon_survives_encode_decode() -> Result<()> {
        let record = EntityRecord::new(1.0, 2).with_text("Hello; World");
        let line = encode_entity(&record);
        assert_eq!(line, "id:1; {Hello; World} CType:2;");

        let decoded = decode_entity(&line)?;
        assert_eq!(decoded, record);
        Ok(())
    }

    #[test]
    fn encode_uses_fixed_tag_order() {
        let record = EntityRecord {
            id: 12.0,
            component_type: 3,
            text: Some("Play".into()),
            font_size: Some(24.4),
            font: Some(1),
            rotation: Some(Quat::from_xyzw(0.0, 0.0, 0.5, 1.0)),
            local_scale: Some(Vec3::new(1.0, 1.0, 1.0)),
            anchor_min: Some(Vec2::new(0.0, 0.5)),
            anchor_max: Some(Vec2::new(1.0, 0.5)),
            anchored_position: Some(Vec2::new(-10.5, 20.0)),
            size_delta: Some(Vec2::new(160.0, 30.0)),
            pivot: Some(Vec2::new(0.5, 0.5)),
            alignment: Some(Alignment::Center),
            reverse: Some(Reverse::True),
        };
        assert_eq!(
            encode_entity(&record),
            "id:12; {Play} S:24; Font:1; \
             XRotation:0; YRotation:0; ZRotation:0.5; WRotation:1; \
             XScale:1; YScale:1; ZScale:1; \
             XAnchorMin:0; YAnchorMin:0.5; XAnchorMax:1; YAnchorMax:0.5; \
             X:-10.5; Y:20; Width:160; Height:30; XPivot:0.5; YPivot:0.5; \
             Ali:2; Rev:2; CType:3;"
        );
    }

    #[test]
    fn decode_restores_only_written_fields() -> Result<()> {
        let mut record = EntityRecord::new(8.0, 1);
        record.anchored_position = Some(Vec2::new(3.25, -4.0));
        record.reverse = Some(Reverse::False);
        record.font = Some(0);

        let decoded = decode_entity(&encode_entity(&record))?;
        assert_eq!(decoded, record);
        assert_eq!(decoded.text, None);
        assert_eq!(decoded.pivot, None);
        assert_eq!(decoded.alignment, None);
        Ok(())
    }

    #[test]
    fn decode_rejects_lines_without_id_prefix() {
        assert!(matches!(
            decode_entity("[Text:1; {x} ids:2]"),
            Err(Error::Parse { expected: "entity", .. })
        ));
    }

    #[test]
    fn decode_reports_malformed_id() {
        match decode_entity("id:abc; CType:1;") {
            Err(Error::MalformedId { value }) => assert_eq!(value, "abc"),
            other => panic!("expected MalformedId, got {:?}", other),
        }
    }

    #[test]
    fn missing_component_type_defaults_to_zero() -> Result<()> {
        let decoded = decode_entity("id:3; {Hi} ")?;
        assert_eq!(decoded.component_type, 0);
        assert_eq!(decoded.text.as_deref(), Some("Hi"));
        Ok(())
    }

    #[test]
    fn tags_inside_text_are_ignored() -> Result<()> {
        let decoded = decode_entity("id:4; {S:99; Ali:3;} CType:1;")?;
        assert_eq!(decoded.font_size, None);
        assert_eq!(decoded.alignment, None);
        assert_eq!(decoded.text.as_deref(), Some("S:99; Ali:3;"));
        Ok(())
    }

    #[test]
    fn braces_match_first_open_to_first_close() {
        let line = "id:7; {Value with ; semicolon and {nested} braces} CType:1;";
        assert_eq!(extract_braced_text(line), "Value with ; semicolon and {nested");
        assert_eq!(strip_braced_text(line), "id:7;  braces} CType:1;");
    }

    #[test]
    fn missing_braces_give_empty_text() {
        assert_eq!(extract_braced_text("id:1; CType:0;"), "");
        assert_eq!(extract_braced_text("id:1; {unterminated CType:0;"), "");
        assert_eq!(strip_braced_text("id:1; CType:0;"), "id:1; CType:0;");
    }

    #[test]
    fn int_tag_defaults_to_zero_when_absent() {
        let line = "id:2; Ali:3; CType:5;";
        assert_eq!(extract_int_tag(line, "Ali:"), 3);
        assert_eq!(extract_int_tag(line, "CType:"), 5);
        assert_eq!(extract_int_tag(line, "Rev:"), 0);
    }

    #[test]
    fn short_tags_do_not_match_inside_longer_ones() {
        let line = "id:2; XPivot:0.5; YPivot:0.25; CType:1;";
        assert_eq!(find_float_tag(line, "X:"), None);
        assert_eq!(find_float_tag(line, "XPivot:"), Some(0.5));
    }

    #[test]
    fn group_line_format() -> Result<()> {
        let group = GroupRecord {
            text_id: 2.0,
            member_ids: "3;4;5".into(),
            text: "Shared".into(),
        };
        let line = encode_group(&group);
        assert_eq!(line, "[Text:2; {Shared} ids:3;4;5]");
        assert_eq!(decode_group(&line)?, group);
        Ok(())
    }

    #[test]
    fn group_text_may_mention_ids() -> Result<()> {
        let decoded = decode_group("[Text:9; {see ids:1} ids:7,8]")?;
        assert_eq!(decoded.text, "see ids:1");
        assert_eq!(decoded.member_ids, "7,8");
        Ok(())
    }

    #[test]
    fn comment_line_format() -> Result<()> {
        let comment = CommentRecord {
            comment_id: 1.5,
            text: "Main menu; buttons".into(),
        };
        let line = encode_comment(&comment);
        assert_eq!(line, "[Comments:1.5; {Main menu; buttons}]");
        assert_eq!(decode_comment(&line)?, comment);
        assert!(matches!(decode_comment("id:1; CType:0;"), Err(Error::Parse { .. })));
        Ok(())
    }
}
