//! Record XML export parsing
//!
//! An export looks like
//!
//! ```xml
//! <xml>
//!   <sys_script_include action="INSERT_OR_UPDATE">
//!     <name>IncidentUtils</name>
//!     <script><![CDATA[var IncidentUtils = Class.create();]]></script>
//!     <active>true</active>
//!   </sys_script_include>
//! </xml>
//! ```
//!
//! Every child element of the first record element is a field. Values pass
//! through [`normalize_field`] before they are stored.

use quick_xml::events::Event;
use quick_xml::Reader;
use recdiff_common::normalize::normalize_field;
use recdiff_common::FieldSet;

use super::SourceError;

/// Element nesting inside the document
const ROOT_DEPTH: usize = 1;
const RECORD_DEPTH: usize = 2;

/// Parse an export document into a normalized field set
///
/// Text and CDATA are concatenated; an empty element is an empty value. When
/// a tag repeats, the later value wins. A document without a record element
/// is an error.
pub fn parse_export(xml: &str) -> Result<FieldSet, SourceError> {
    let mut reader = Reader::from_str(xml);

    let mut fields = FieldSet::new();
    let mut depth = 0usize;
    let mut record_seen = false;
    let mut in_record = false;
    // Field being read: (name, text)
    let mut current: Option<(String, String)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SourceError::Parse(format!("export XML at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => {
                depth += 1;
                if depth == RECORD_DEPTH && !record_seen {
                    record_seen = true;
                    in_record = true;
                } else if depth == RECORD_DEPTH + 1 && in_record {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    current = Some((name, String::new()));
                }
            }
            Event::Empty(e) => {
                if depth + 1 == RECORD_DEPTH && !record_seen {
                    record_seen = true;
                } else if depth == RECORD_DEPTH && in_record {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    fields.insert(name, String::new());
                }
            }
            Event::Text(e) => {
                if let Some((_, text)) = current.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| SourceError::Parse(format!("export XML text: {}", e)))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                if depth == RECORD_DEPTH + 1 && in_record {
                    if let Some((name, raw)) = current.take() {
                        let value = normalize_field(&name, &raw);
                        fields.insert(name, value);
                    }
                } else if depth == RECORD_DEPTH && in_record {
                    in_record = false;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth >= ROOT_DEPTH {
        return Err(SourceError::Parse("export XML ends inside an element".to_string()));
    }
    if !record_seen {
        return Err(SourceError::Parse("export XML contains no record element".to_string()));
    }
    Ok(fields)
}
