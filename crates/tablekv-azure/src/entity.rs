//! Atom entry codec for the tabular wire protocol.
//!
//! Encoding writes the exact envelope the service expects, byte for byte:
//! header line, namespace declarations, indentation, and the property
//! fragment appended inline inside `content`. Decoding walks the document
//! with a `quick-xml` event reader and honors `m:type` attributes; an
//! element without one always decodes as a string.

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tablekv::{Record, StorageError, StorageResult, Value};

use crate::clock::edm_datetime;

pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const DATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices";
pub const METADATA_NS: &str = "http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";

/// Serialize a record as an Atom `entry`. `resource_id` is empty for
/// inserts and the canonical (unencoded) resource URL for updates;
/// `updated` is the request instant.
pub fn encode_entry(record: &Record, resource_id: Option<&str>, updated: DateTime<Utc>) -> Vec<u8> {
    let mut props = String::new();
    for (name, value) in record.iter() {
        let text = wire_text(value);
        match value.edm_type() {
            Some(tag) => {
                props.push_str(&format!(
                    "<d:{name} m:type=\"{tag}\">{}</d:{name}>",
                    escape_text(&text)
                ));
            }
            None if text.is_empty() => props.push_str(&format!("<d:{name}/>")),
            None => {
                props.push_str(&format!("<d:{name}>{}</d:{name}>", escape_text(&text)));
            }
        }
    }

    let mut doc = String::with_capacity(512 + props.len());
    doc.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\"?>\n");
    doc.push_str(&format!(
        "<entry xmlns:d=\"{DATA_NS}\" xmlns:m=\"{METADATA_NS}\" xmlns=\"{ATOM_NS}\">\n"
    ));
    doc.push_str("  <title/>\n");
    doc.push_str(&format!("  <updated>{}</updated>\n", edm_datetime(updated)));
    doc.push_str("  <author>\n    <name/>\n  </author>\n");
    match resource_id {
        Some(url) => doc.push_str(&format!("  <id>{}</id>\n", escape_text(url))),
        None => doc.push_str("  <id/>\n"),
    }
    doc.push_str("  <content type=\"application/xml\">\n    \n  <m:properties>\n    ");
    doc.push_str(&props);
    doc.push_str("</m:properties></content>\n</entry>\n");
    doc.into_bytes()
}

/// Parse the `m:properties` children of an Atom `entry` back into a record.
pub fn decode_entry(bytes: &[u8]) -> StorageResult<Record> {
    let content = std::str::from_utf8(bytes)
        .map_err(|err| StorageError::MalformedEntity(err.to_string()))?;
    let mut reader = Reader::from_str(content);

    let mut record = Record::new();
    let mut saw_properties = false;
    let mut in_properties = false;
    let mut current: Option<(String, Option<String>)> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let local = local_name(e.name().as_ref());
                if local == "properties" {
                    saw_properties = true;
                    in_properties = true;
                } else if in_properties {
                    current = Some((local, type_attribute(e)));
                    text_buf.clear();
                }
            }
            Ok(Event::Empty(ref e)) => {
                let local = local_name(e.name().as_ref());
                if local == "properties" {
                    saw_properties = true;
                } else if in_properties {
                    let value = typed_value("", type_attribute(e).as_deref())?;
                    record.push(local, value);
                }
            }
            Ok(Event::Text(ref e)) => {
                if current.is_some() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| StorageError::MalformedEntity(err.to_string()))?;
                    text_buf.push_str(&unescaped);
                }
            }
            Ok(Event::End(ref e)) => {
                let local = local_name(e.name().as_ref());
                if local == "properties" {
                    in_properties = false;
                } else if let Some((name, edm)) = current.take_if(|(name, _)| *name == local) {
                    record.push(name, typed_value(&text_buf, edm.as_deref())?);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(StorageError::MalformedEntity(err.to_string())),
            _ => {}
        }
    }

    if !saw_properties {
        return Err(StorageError::MalformedEntity(
            "entry has no properties element".to_string(),
        ));
    }
    Ok(record)
}

/// Textual wire form of a value: doubles keep full precision, booleans are
/// `0`/`1`, timestamps use the seven-fraction-digit form.
pub(crate) fn wire_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Timestamp(t) => edm_datetime(*t),
    }
}

fn typed_value(text: &str, edm: Option<&str>) -> StorageResult<Value> {
    let value = match edm {
        None => Value::String(text.to_string()),
        Some("Edm.Int32") => Value::Int(text.trim().parse::<i32>().map_err(|err| {
            StorageError::MalformedEntity(format!("invalid Edm.Int32 {text:?}: {err}"))
        })?),
        Some("Edm.Double") => Value::Double(text.trim().parse::<f64>().map_err(|err| {
            StorageError::MalformedEntity(format!("invalid Edm.Double {text:?}: {err}"))
        })?),
        Some("Edm.Boolean") => match text.trim() {
            "1" | "true" => Value::Bool(true),
            "0" | "false" => Value::Bool(false),
            other => {
                return Err(StorageError::MalformedEntity(format!(
                    "invalid Edm.Boolean {other:?}"
                )));
            }
        },
        Some("Edm.DateTime") => {
            let parsed = DateTime::parse_from_rfc3339(text.trim()).map_err(|err| {
                StorageError::MalformedEntity(format!("invalid Edm.DateTime {text:?}: {err}"))
            })?;
            Value::Timestamp(parsed.with_timezone(&Utc))
        }
        // Type tags outside the supported vocabulary keep their raw text.
        Some(_) => Value::String(text.to_string()),
    };
    Ok(value)
}

fn local_name(qname: &[u8]) -> String {
    let name = String::from_utf8_lossy(qname);
    match name.find(':') {
        Some(pos) => name[pos + 1..].to_string(),
        None => name.to_string(),
    }
}

fn type_attribute(e: &BytesStart) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"m:type" {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 3, 26, 10, 10, 10).unwrap()
    }

    #[test]
    fn encode_typed_values_expected_edm_attributes() {
        let mut record = Record::new();
        record.push("name", "Test");
        record.push("value", 23);
        record.push("amount", 200.23);
        record.push("active", true);
        record.push(
            "timestamp",
            Utc.with_ymd_and_hms(2012, 3, 26, 12, 12, 12).unwrap(),
        );

        let body = String::from_utf8(encode_entry(&record, None, request_instant())).unwrap();

        assert!(body.contains("<d:name>Test</d:name>"));
        assert!(body.contains("<d:value m:type=\"Edm.Int32\">23</d:value>"));
        assert!(body.contains("<d:amount m:type=\"Edm.Double\">200.23</d:amount>"));
        assert!(body.contains("<d:active m:type=\"Edm.Boolean\">1</d:active>"));
        assert!(body.contains(
            "<d:timestamp m:type=\"Edm.DateTime\">2012-03-26T12:12:12.0000000Z</d:timestamp>"
        ));
    }

    #[test]
    fn encode_untyped_strings_expected_no_type_attribute() {
        let mut record = Record::new();
        record.push("value", "1");
        record.push("empty", "");

        let body = String::from_utf8(encode_entry(&record, None, request_instant())).unwrap();

        assert!(body.contains("<d:value>1</d:value>"));
        assert!(body.contains("<d:empty/>"));
        assert!(!body.contains("m:type"));
    }

    #[test]
    fn encode_insert_expected_empty_id_and_updated_instant() {
        let record = Record::new();

        let body = String::from_utf8(encode_entry(&record, None, request_instant())).unwrap();

        assert!(body.contains("  <id/>\n"));
        assert!(body.contains("<updated>2012-03-26T10:10:10.0000000Z</updated>"));
        assert!(body.contains("<title/>"));
    }

    #[test]
    fn encode_update_expected_resource_url_in_id() {
        let record = Record::new();
        let url = "https://teststore.table.core.windows.net/stdClass(PartitionKey='foo', RowKey='100')";

        let body = String::from_utf8(encode_entry(&record, Some(url), request_instant())).unwrap();

        assert!(body.contains(&format!("<id>{url}</id>")));
    }

    #[test]
    fn encode_special_characters_expected_escaped_text() {
        let mut record = Record::new();
        record.push("name", "a & b <c>");

        let body = String::from_utf8(encode_entry(&record, None, request_instant())).unwrap();

        assert!(body.contains("<d:name>a &amp; b &lt;c&gt;</d:name>"));
    }

    #[test]
    fn decode_typed_properties_expected_native_values() {
        let body = concat!(
            "<?xml version=\"1.0\" ?>\n",
            "<entry xmlns:d=\"http://schemas.microsoft.com/ado/2007/08/dataservices\" ",
            "xmlns:m=\"http://schemas.microsoft.com/ado/2007/08/dataservices/metadata\" ",
            "xmlns=\"http://www.w3.org/2005/Atom\">\n",
            "  <content type=\"application/xml\">\n",
            "    <m:properties>\n",
            "      <d:PartitionKey>foo</d:PartitionKey>\n",
            "      <d:timestamp m:type=\"Edm.DateTime\">2008-09-18T23:46:19.4277424Z</d:timestamp>\n",
            "      <d:value m:type=\"Edm.Int32\">23</d:value>\n",
            "      <d:amount m:type=\"Edm.Double\">200.23</d:amount>\n",
            "      <d:bool m:type=\"Edm.Boolean\">1</d:bool>\n",
            "    </m:properties>\n",
            "  </content>\n",
            "</entry>",
        );

        let record = decode_entry(body.as_bytes()).expect("entry should decode");

        assert_eq!(
            record.get("PartitionKey"),
            Some(&Value::String("foo".to_string()))
        );
        assert_eq!(record.get("value"), Some(&Value::Int(23)));
        assert_eq!(record.get("amount"), Some(&Value::Double(200.23)));
        assert_eq!(record.get("bool"), Some(&Value::Bool(true)));
        let expected = DateTime::parse_from_rfc3339("2008-09-18T23:46:19.4277424Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(record.get("timestamp"), Some(&Value::Timestamp(expected)));
    }

    #[test]
    fn decode_untyped_element_expected_string_not_inferred() {
        let body = concat!(
            "<entry xmlns=\"http://www.w3.org/2005/Atom\"><content>",
            "<m:properties><d:bool>1</d:bool></m:properties>",
            "</content></entry>",
        );

        let record = decode_entry(body.as_bytes()).expect("entry should decode");

        assert_eq!(record.get("bool"), Some(&Value::String("1".to_string())));
    }

    #[test]
    fn decode_empty_property_element_expected_empty_string() {
        let body = concat!(
            "<entry><content><m:properties>",
            "<d:note/>",
            "</m:properties></content></entry>",
        );

        let record = decode_entry(body.as_bytes()).expect("entry should decode");

        assert_eq!(record.get("note"), Some(&Value::String(String::new())));
    }

    #[test]
    fn decode_missing_properties_element_expected_malformed_entity() {
        let body = "<entry><content type=\"application/xml\"/></entry>";

        let error = decode_entry(body.as_bytes()).expect_err("decode should fail");

        assert!(matches!(error, StorageError::MalformedEntity(_)));
    }

    #[test]
    fn decode_invalid_xml_expected_malformed_entity() {
        let dangling = decode_entry(b"<entry><content>").expect_err("decode should fail");
        let garbage = decode_entry(b"not xml at all").expect_err("decode should fail");

        assert!(matches!(dangling, StorageError::MalformedEntity(_)));
        assert!(matches!(garbage, StorageError::MalformedEntity(_)));
    }

    #[test]
    fn decode_invalid_typed_text_expected_malformed_entity() {
        let body = concat!(
            "<entry><content><m:properties>",
            "<d:value m:type=\"Edm.Int32\">not-a-number</d:value>",
            "</m:properties></content></entry>",
        );

        let error = decode_entry(body.as_bytes()).expect_err("decode should fail");

        assert!(matches!(error, StorageError::MalformedEntity(_)));
    }

    #[test]
    fn round_trip_typed_record_expected_equal() {
        let mut record = Record::new();
        record.push("PartitionKey", "foo");
        record.push("value", 23);
        record.push("amount", 200.23);
        record.push("active", false);
        record.push(
            "timestamp",
            Utc.with_ymd_and_hms(2012, 3, 26, 12, 12, 12).unwrap(),
        );

        let encoded = encode_entry(&record, None, request_instant());
        let decoded = decode_entry(&encoded).expect("entry should decode");

        assert_eq!(decoded, record);
    }
}
