//! Reading, writing and querying line-based language files.
//!
//! A language file starts with a label line (`Linguagem - [ENGLISH]`) and a
//! culture line, followed by one record per line:
//!
//! ```text
//! id:1; {Play} S:24; Ali:2; CType:1;
//! [Text:5; {Shared text} ids:1;3]
//! [Comments:1; {Main menu}]
//! ```

pub mod binding;
pub mod codec;
pub mod error;
pub mod langfile;
pub mod lookup;
pub mod record;
pub mod settings;

pub use error::{Error, Result};
pub use langfile::{LanguageFile, TextEntry, TextKind};
pub use record::{Alignment, CommentRecord, EntityRecord, Field, FieldValue, GroupRecord, Reverse};
pub use settings::Settings;
