//! XML result writer.
//!
//! Writes one `page` element per processed page, each containing a
//! `wrapper-result` element per instance; extracted fields become one
//! child element per declared field name.

use std::borrow::Cow;
use std::io::Write;

use regex::Regex;

use crate::geom::bbox2str;
use crate::pipeline::PageResult;
use crate::wrapper::Instance;

/// Escapes a string for use in an XML attribute value.
pub fn enc_attr(x: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(x)
}

/// Escapes a string for use as XML text content.
pub fn enc_text(x: &str) -> Cow<'_, str> {
    html_escape::encode_text(x)
}

/// XML result writer over any output stream.
pub struct XmlResultWriter<W: Write> {
    outfp: W,
    codec: String,
    stripcontrol: bool,
    control_re: Regex,
}

impl<W: Write> XmlResultWriter<W> {
    /// Creates a writer and emits the document header.
    pub fn new(outfp: W, codec: &str) -> Self {
        let mut writer = Self {
            outfp,
            codec: codec.to_string(),
            stripcontrol: false,
            control_re: Regex::new(r"[\x00-\x08\x0b-\x0c\x0e-\x1f]").unwrap(),
        };
        writer.write_header();
        writer
    }

    /// Create with options.
    pub fn with_options(outfp: W, codec: &str, stripcontrol: bool) -> Self {
        let mut writer = Self::new(outfp, codec);
        writer.stripcontrol = stripcontrol;
        writer
    }

    fn write(&mut self, text: &str) {
        let _ = self.outfp.write_all(text.as_bytes());
    }

    fn write_header(&mut self) {
        if !self.codec.is_empty() {
            let decl = format!("<?xml version=\"1.0\" encoding=\"{}\" ?>\n", self.codec);
            self.write(&decl);
        } else {
            self.write("<?xml version=\"1.0\" ?>\n");
        }
        self.write("<pages>\n");
    }

    fn clean(&self, text: &str) -> String {
        if self.stripcontrol {
            self.control_re.replace_all(text, "").to_string()
        } else {
            text.to_string()
        }
    }

    /// Receives and renders one page result.
    pub fn write_page(&mut self, result: &PageResult) {
        let page_xml = format!(
            "<page id=\"{}\" bbox=\"{}\">\n",
            result.page,
            bbox2str(result.bbox)
        );
        self.write(&page_xml);
        for instance in &result.instances {
            self.write_instance(instance);
        }
        self.write("</page>\n");
    }

    fn write_instance(&mut self, instance: &Instance) {
        let open = format!(
            "<wrapper-result name=\"{}\" bbox=\"{}\">\n",
            enc_attr(&instance.wrapper),
            bbox2str(instance.bbox)
        );
        self.write(&open);
        for (name, value) in &instance.fields {
            let value = self.clean(value);
            let field = format!("<{}>{}</{}>\n", name, enc_text(&value), name);
            self.write(&field);
        }
        for child in &instance.children {
            self.write_instance(child);
        }
        self.write("</wrapper-result>\n");
    }

    /// Writes the footer and flushes the output.
    pub fn close(&mut self) {
        self.write("</pages>\n");
        let _ = self.outfp.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_writer_escapes_field_values() {
        let mut fields = IndexMap::new();
        fields.insert("amount".to_string(), "1 < 2 & 3".to_string());
        let result = PageResult {
            page: 1,
            bbox: (0.0, 0.0, 100.0, 100.0),
            instances: vec![Instance {
                wrapper: "row".to_string(),
                bbox: (0.0, 0.0, 50.0, 10.0),
                items: Vec::new(),
                fields,
                children: Vec::new(),
            }],
        };

        let mut buf = Vec::new();
        let mut writer = XmlResultWriter::new(&mut buf, "utf-8");
        writer.write_page(&result);
        writer.close();

        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<pages>\n"));
        assert!(out.contains("<page id=\"1\""));
        assert!(out.contains("<wrapper-result name=\"row\""));
        assert!(out.contains("<amount>1 &lt; 2 &amp; 3</amount>"));
        assert!(out.ends_with("</pages>\n"));
    }
}
