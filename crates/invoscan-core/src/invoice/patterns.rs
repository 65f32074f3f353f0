//! Regex patterns for Russian invoice field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // DD.MM.YYYY, DD/MM/YYYY or DD-MM-YYYY
    pub static ref DATE: Regex = Regex::new(
        r"(\d{2}[./-]\d{2}[./-]\d{4})"
    ).unwrap();

    // First numeric token after the total marker, same line.
    // Decimal separator may be comma or period.
    pub static ref TOTAL: Regex = Regex::new(
        r"(?i)Итого.*?(\d+[.,]?\d*)"
    ).unwrap();

    // Free-text run after the supplier marker, up to end of line.
    pub static ref SUPPLIER: Regex = Regex::new(
        r#"Поставщик:?[ \t]*([\w «»"'.,-]+)"#
    ).unwrap();
}
