//! Result serialization.

pub mod xml;

pub use xml::{XmlResultWriter, enc_attr, enc_text};
