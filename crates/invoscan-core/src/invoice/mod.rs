//! Rule-based field extraction from recognized invoice text.

pub mod parser;
pub mod patterns;

pub use parser::{ParsedFields, parse_invoice_text};
