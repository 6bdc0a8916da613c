//! Per-id queries against a language file on disk.
//!
//! Every query reads the whole file and scans it top to bottom, stopping at
//! the first matching line. If several lines share an id the first one in
//! file order wins. Queries never fail: a missing or unreadable file is
//! reported as "not found".

use std::fs;
use std::path::Path;

use crate::codec::{
    decode_comment, decode_entity, decode_group, encode_entity, entity_id, COMMENT_PREFIX,
    ENTITY_PREFIX, GROUP_PREFIX,
};
use crate::error::{Error, Result};
use crate::langfile::decode_text;
use crate::record::{CommentRecord, EntityRecord, GroupRecord};

pub use crate::codec::{extract_braced_text, extract_int_tag, strip_braced_text};

pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::MissingFile {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;
    Ok(decode_text(&data).lines().map(str::to_string).collect())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut out = lines.join("\n");
    out.push('\n');
    fs::write(path, out)?;
    Ok(())
}

/// Lines of the file, or `None` (logged) when it cannot be read.
fn query_lines(path: &Path) -> Option<Vec<String>> {
    match read_lines(path) {
        Ok(lines) => Some(lines),
        Err(e @ Error::MissingFile { .. }) => {
            tracing::debug!("{}", e);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// First entity line whose id equals `id`.
pub fn find_in_lines<S: AsRef<str>>(lines: &[S], id: f32) -> Option<&str> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| line.starts_with(ENTITY_PREFIX))
        .find(|line| entity_id(line).is_ok_and(|found| found == id))
}

pub fn find_group_in_lines<S: AsRef<str>>(lines: &[S], text_id: f32) -> Option<GroupRecord> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| line.starts_with(GROUP_PREFIX))
        .filter_map(|line| decode_group(line).ok())
        .find(|group| group.text_id == text_id)
}

pub fn find_comment_in_lines<S: AsRef<str>>(lines: &[S], comment_id: f32) -> Option<CommentRecord> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| line.starts_with(COMMENT_PREFIX))
        .filter_map(|line| decode_comment(line).ok())
        .find(|comment| comment.comment_id == comment_id)
}

/// First entity line for `id` in the file at `path`.
pub fn find_by_id<P: AsRef<Path>>(path: P, id: f32) -> Option<String> {
    let lines = query_lines(path.as_ref())?;
    find_in_lines(&lines, id).map(str::to_string)
}

pub fn find_entity<P: AsRef<Path>>(path: P, id: f32) -> Option<EntityRecord> {
    let line = find_by_id(path, id)?;
    match decode_entity(&line) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Entity {} is unreadable: {}", id, e);
            None
        }
    }
}

pub fn find_group<P: AsRef<Path>>(path: P, text_id: f32) -> Option<GroupRecord> {
    find_group_in_lines(&query_lines(path.as_ref())?, text_id)
}

pub fn find_comment<P: AsRef<Path>>(path: P, comment_id: f32) -> Option<CommentRecord> {
    find_comment_in_lines(&query_lines(path.as_ref())?, comment_id)
}

/// Replace the first entity line with the record's id. Other lines are left
/// untouched. Returns whether a line was replaced.
pub fn replace_entity_line(lines: &mut [String], record: &EntityRecord) -> bool {
    let slot = lines.iter_mut().find(|line| {
        line.starts_with(ENTITY_PREFIX) && entity_id(line).is_ok_and(|id| id == record.id)
    });
    match slot {
        Some(line) => {
            *line = encode_entity(record);
            true
        }
        None => false,
    }
}

/// Rewrite one entity in the file at `path`, appending it after the last
/// entity line when the id is new. Returns `true` if an existing line was
/// replaced.
pub fn upsert_entity<P: AsRef<Path>>(path: P, record: &EntityRecord) -> Result<bool> {
    let path = path.as_ref();
    let mut lines = read_lines(path)?;

    let replaced = replace_entity_line(&mut lines, record);
    if !replaced {
        let header_end = lines.len().min(2);
        let insert_at = lines
            .iter()
            .rposition(|line| line.starts_with(ENTITY_PREFIX))
            .map_or(header_end, |last| last + 1);
        lines.insert(insert_at, encode_entity(record));
    }
    tracing::debug!(
        "{} entity {} in {}",
        if replaced { "Replaced" } else { "Added" },
        record.id,
        path.display()
    );

    write_lines(path, &lines)?;
    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const SAMPLE: &str = "Linguagem - [ENGLISH]\n\
        English (United States)\n\
        id:5; {A} CType:1;\n\
        id:6; {Other} Ali:3; CType:1;\n\
        id:5; {B} CType:1;\n\
        [Text:5; {Group five} ids:5;6]\n\
        [Comments:5; {Note five}]\n";

    fn sample_file() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("english.txt");
        fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    #[test]
    fn first_duplicate_wins() {
        let (_dir, path) = sample_file();
        let line = find_by_id(&path, 5.0).unwrap();
        assert_eq!(extract_braced_text(&line), "A");
    }

    #[test]
    fn lookup_ignores_group_and_comment_ids() {
        let lines: Vec<&str> = SAMPLE.lines().collect();
        assert_eq!(find_in_lines(&lines, 6.0), Some("id:6; {Other} Ali:3; CType:1;"));
        let only_groups = ["[Text:7; {x} ids:1]", "[Comments:7; {y}]"];
        assert_eq!(find_in_lines(&only_groups, 7.0), None);
    }

    #[test]
    fn absent_id_is_not_found() {
        let (_dir, path) = sample_file();
        assert_eq!(find_by_id(&path, 99.0), None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert_eq!(find_by_id(&path, 1.0), None);
        assert_eq!(find_group(&path, 1.0), None);
        assert!(matches!(read_lines(&path), Err(Error::MissingFile { .. })));
    }

    #[test]
    fn decoded_accessors() {
        let (_dir, path) = sample_file();
        let entity = find_entity(&path, 6.0).unwrap();
        assert_eq!(entity.text.as_deref(), Some("Other"));

        let group = find_group(&path, 5.0).unwrap();
        assert_eq!(group.text, "Group five");
        assert_eq!(group.member_ids, "5;6");

        let comment = find_comment(&path, 5.0).unwrap();
        assert_eq!(comment.text, "Note five");
    }

    #[test]
    fn tags_read_from_stripped_line() {
        let line = "id:9; {Ali:1 is text} Ali:3; CType:2;";
        let tags = strip_braced_text(line);
        assert_eq!(extract_int_tag(&tags, "Ali:"), 3);
        assert_eq!(extract_int_tag(&tags, "Font:"), 0);
    }

    #[test]
    fn replace_touches_only_first_match() {
        let mut lines: Vec<String> = SAMPLE.lines().map(str::to_string).collect();
        let record = EntityRecord::new(5.0, 1).with_text("Replaced");
        assert!(replace_entity_line(&mut lines, &record));
        assert_eq!(lines[2], "id:5; {Replaced} CType:1;");
        assert_eq!(lines[4], "id:5; {B} CType:1;");
        assert!(!replace_entity_line(&mut lines, &EntityRecord::new(77.0, 0)));
    }

    #[test]
    fn upsert_replaces_or_appends_after_entities() -> Result<()> {
        let (_dir, path) = sample_file();

        assert!(upsert_entity(&path, &EntityRecord::new(6.0, 1).with_text("Changed"))?);
        assert!(!upsert_entity(&path, &EntityRecord::new(8.0, 4).with_text("New"))?);

        let lines = read_lines(&path)?;
        assert_eq!(
            lines,
            vec![
                "Linguagem - [ENGLISH]",
                "English (United States)",
                "id:5; {A} CType:1;",
                "id:6; {Changed} CType:1;",
                "id:5; {B} CType:1;",
                "id:8; {New} CType:4;",
                "[Text:5; {Group five} ids:5;6]",
                "[Comments:5; {Note five}]",
            ]
        );
        Ok(())
    }

    #[test]
    fn upsert_into_header_only_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fr.txt");
        fs::write(&path, "Linguagem - [FRENCH]\nFrench (France)\n[Comments:1; {c}]\n")?;

        upsert_entity(&path, &EntityRecord::new(1.0, 1).with_text("Jouer"))?;
        assert_eq!(
            fs::read_to_string(&path)?,
            "Linguagem - [FRENCH]\nFrench (France)\nid:1; {Jouer} CType:1;\n[Comments:1; {c}]\n"
        );
        Ok(())
    }
}
