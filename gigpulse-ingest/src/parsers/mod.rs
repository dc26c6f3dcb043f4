pub mod consent_csv;
pub mod shifts_csv;
