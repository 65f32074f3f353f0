//! Invoice field parser.
//!
//! Pure and total over all string inputs: absent markers yield `None`,
//! malformed text never panics. First match wins for every field; there is
//! no backtracking across candidate matches.

use serde::{Deserialize, Serialize};

use super::patterns::{DATE, SUPPLIER, TOTAL};

/// Fields extracted from recognized invoice text. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFields {
    /// Date token as it appeared, e.g. `01.02.2024`. No calendar validation.
    pub date: Option<String>,

    /// Total following the "Итого" marker, comma normalized to period.
    pub total: Option<String>,

    /// Supplier name following the "Поставщик:" marker, trimmed.
    pub supplier: Option<String>,
}

/// Extract structured fields from recognized text.
pub fn parse_invoice_text(text: &str) -> ParsedFields {
    let date = DATE
        .captures(text)
        .map(|caps| caps[1].to_string());

    let total = TOTAL
        .captures(text)
        .map(|caps| caps[1].replace(',', "."));

    let supplier = SUPPLIER
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty());

    ParsedFields {
        date,
        total,
        supplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_total_with_comma_separator() {
        let fields = parse_invoice_text("Итого: 1234,56 руб");
        assert_eq!(fields.total.as_deref(), Some("1234.56"));
    }

    #[test]
    fn test_total_marker_case_insensitive() {
        let fields = parse_invoice_text("ИТОГО 500");
        assert_eq!(fields.total.as_deref(), Some("500"));
    }

    #[test]
    fn test_no_markers_yields_all_absent() {
        let fields = parse_invoice_text("no markers here");
        assert_eq!(fields, ParsedFields::default());
    }

    #[test]
    fn test_empty_input() {
        let fields = parse_invoice_text("");
        assert_eq!(fields, ParsedFields::default());
    }

    #[test]
    fn test_date_separators() {
        assert_eq!(
            parse_invoice_text("дата 01.02.2024").date.as_deref(),
            Some("01.02.2024")
        );
        assert_eq!(
            parse_invoice_text("дата 01/02/2024").date.as_deref(),
            Some("01/02/2024")
        );
        assert_eq!(
            parse_invoice_text("дата 01-02-2024").date.as_deref(),
            Some("01-02-2024")
        );
    }

    #[test]
    fn test_first_date_wins() {
        let fields = parse_invoice_text("от 03.04.2024 до 05.06.2024");
        assert_eq!(fields.date.as_deref(), Some("03.04.2024"));
    }

    #[test]
    fn test_supplier_trimmed() {
        let fields = parse_invoice_text("Поставщик:  ООО «Ромашка»  \nИтого: 10");
        assert_eq!(fields.supplier.as_deref(), Some("ООО «Ромашка»"));
        assert_eq!(fields.total.as_deref(), Some("10"));
    }

    #[test]
    fn test_supplier_without_colon() {
        let fields = parse_invoice_text("Поставщик ИП Иванов");
        assert_eq!(fields.supplier.as_deref(), Some("ИП Иванов"));
    }

    #[test]
    fn test_full_invoice_text() {
        let text = "Накладная от 15.03.2024\nПоставщик: ООО Альфа\nИтого: 9 999,99";
        let fields = parse_invoice_text(text);
        assert_eq!(fields.date.as_deref(), Some("15.03.2024"));
        assert_eq!(fields.supplier.as_deref(), Some("ООО Альфа"));
        // The number token stops at the thousands space.
        assert_eq!(fields.total.as_deref(), Some("9"));
    }

    #[test]
    fn test_never_panics_on_garbage() {
        for input in ["\u{0000}\u{ffff}", "Итого", "Поставщик:", "01.02.20"] {
            let _ = parse_invoice_text(input);
        }
    }
}
