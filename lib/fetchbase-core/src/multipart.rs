//! Multipart form payloads.
//!
//! A [`Form`] is the equivalent of a browser `FormData`: an ordered list of
//! named fields, appended one by one. It is carried as-is in the request
//! descriptor and only encoded by the transport, which also owns the
//! boundary-bearing `Content-Type` header.
//!
//! # Example
//!
//! ```
//! use fetchbase_core::{Form, Part};
//!
//! let form = Form::new()
//!     .text("sub_id", "user-42")
//!     .part(Part::file("file", "cat.png", vec![0x89, 0x50, 0x4E, 0x47]));
//!
//! assert_eq!(form.parts().len(), 2);
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::{Error, Result};

/// A single named field in a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// Create a text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: Bytes::from(value.into()),
        }
    }

    /// Create a field from a JSON value.
    ///
    /// Strings are appended verbatim, every other value is JSON-encoded
    /// (`42`, `true`, `{"a":1}`).
    #[must_use]
    pub fn value(name: impl Into<String>, value: &Value) -> Self {
        let text = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Self::text(name, text)
    }

    /// Create a file field; the content type is guessed from the extension.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename);
        Self {
            name: name.into(),
            filename: Some(filename),
            content_type: Some(content_type.to_string()),
            data: data.into(),
        }
    }

    /// Override the content type of this field.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name, for file fields.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Content type, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Raw field data.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Write a quoted-string parameter, percent-encoding `"`, CR and LF as
/// browsers do.
fn put_quoted(buf: &mut BytesMut, value: &str) {
    for byte in value.bytes() {
        match byte {
            b'"' => buf.put_slice(b"%22"),
            b'\r' => buf.put_slice(b"%0D"),
            b'\n' => buf.put_slice(b"%0A"),
            other => buf.put_u8(other),
        }
    }
}

/// An ordered multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    parts: Vec<Part>,
}

impl Form {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a form by appending every entry of a JSON map, in map order.
    ///
    /// # Errors
    ///
    /// Returns an error if a key contains a line break.
    pub fn from_map(map: &serde_json::Map<String, Value>) -> Result<Self> {
        map.iter().try_fold(Self::new(), |form, (name, value)| {
            if name.contains(['\r', '\n']) {
                return Err(Error::invalid_request(format!(
                    "form field name contains a line break: {name:?}"
                )));
            }
            Ok(form.part(Part::value(name, value)))
        })
    }

    /// Append a field.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.append(part);
        self
    }

    /// Append a text field.
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(Part::text(name, value))
    }

    /// Append a field in place.
    ///
    /// Like `FormData.append`, an existing field with the same name is kept.
    pub fn append(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Fields, in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// First field with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// Returns `true` when the form has no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Encode the form with the given boundary.
    ///
    /// Returns the `Content-Type` header value and the body bytes.
    #[must_use]
    pub fn encode(&self, boundary: &str) -> (String, Bytes) {
        let mut buf = BytesMut::new();

        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(boundary.as_bytes());
            buf.put_slice(b"\r\nContent-Disposition: form-data; name=\"");
            put_quoted(&mut buf, &part.name);
            buf.put_u8(b'"');
            if let Some(filename) = &part.filename {
                buf.put_slice(b"; filename=\"");
                put_quoted(&mut buf, filename);
                buf.put_u8(b'"');
            }
            buf.put_slice(b"\r\n");

            if let Some(content_type) = &part.content_type {
                buf.put_slice(b"Content-Type: ");
                buf.put_slice(content_type.as_bytes());
                buf.put_slice(b"\r\n");
            }

            buf.put_slice(b"\r\n");
            buf.put_slice(&part.data);
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"--");
        buf.put_slice(boundary.as_bytes());
        buf.put_slice(b"--\r\n");

        (
            format!("multipart/form-data; boundary={boundary}"),
            buf.freeze(),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn part_from_values() {
        assert_eq!(Part::value("name", &json!("Tom")).data().as_ref(), b"Tom");
        assert_eq!(Part::value("age", &json!(3)).data().as_ref(), b"3");
        assert_eq!(
            Part::value("tags", &json!(["a", "b"])).data().as_ref(),
            br#"["a","b"]"#
        );
    }

    #[test]
    fn part_file_guesses_content_type() {
        let part = Part::file("upload", "photo.JPG", vec![0xFF, 0xD8]);
        assert_eq!(part.filename(), Some("photo.JPG"));
        assert_eq!(part.content_type(), Some("image/jpeg"));

        let part = Part::file("upload", "blob", vec![0]);
        assert_eq!(part.content_type(), Some("application/octet-stream"));
    }

    #[test]
    fn form_from_map_keeps_every_entry() {
        let map = json!({ "name": "Tom", "lives": 9 });
        let serde_json::Value::Object(map) = map else {
            unreachable!("object literal");
        };

        let form = Form::from_map(&map).expect("form");
        assert_eq!(form.parts().len(), 2);
        assert_eq!(form.get("name").map(|p| p.data().as_ref()), Some(&b"Tom"[..]));
        assert_eq!(form.get("lives").map(|p| p.data().as_ref()), Some(&b"9"[..]));
    }

    #[test]
    fn append_keeps_duplicates() {
        let mut form = Form::new().text("tag", "a");
        form.append(Part::text("tag", "b"));
        assert_eq!(form.parts().len(), 2);
        assert_eq!(form.get("tag").map(Part::data), Some(&Bytes::from("a")));
    }

    #[test]
    fn encode_form() {
        let form = Form::new()
            .text("name", "Tom")
            .part(Part::file("avatar", "tom.png", vec![1, 2]));

        let (content_type, body) = form.encode("XBOUNDARY");
        assert_eq!(content_type, "multipart/form-data; boundary=XBOUNDARY");

        let expected: &[u8] = b"--XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"name\"\r\n\
            \r\n\
            Tom\r\n\
            --XBOUNDARY\r\n\
            Content-Disposition: form-data; name=\"avatar\"; filename=\"tom.png\"\r\n\
            Content-Type: image/png\r\n\
            \r\n\
            \x01\x02\r\n\
            --XBOUNDARY--\r\n";
        assert_eq!(body.as_ref(), expected);
    }

    #[test]
    fn form_from_map_rejects_line_breaks_in_keys() {
        let mut map = serde_json::Map::new();
        map.insert("name\r\nX-Injected: 1".to_string(), json!("Tom"));

        assert!(matches!(
            Form::from_map(&map),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn encode_escapes_quotes_and_line_breaks() {
        let form = Form::new()
            .text("say \"hi\"", "x")
            .part(Part::file("file", "a\"b\r\n.txt", vec![]));

        let (_, body) = form.encode("B");
        let body = String::from_utf8_lossy(&body);

        assert!(body.contains("name=\"say %22hi%22\"\r\n"), "{body}");
        assert!(body.contains("filename=\"a%22b%0D%0A.txt\"\r\n"), "{body}");
    }
}
