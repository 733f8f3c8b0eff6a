use std::io;

use serde::Serialize;

use crate::error::Result;

/// How command results are printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Serialize rows as CSV with a header taken from the first row's field names
pub(crate) fn write_csv<W: io::Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub(crate) fn print_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    write_csv(io::stdout().lock(), rows)
}

/// Format an optional number, "-" when missing
pub(crate) fn format_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        value: f64,
    }

    #[test]
    fn test_write_csv_quotes_fields() {
        let rows = [
            Row { name: "b,c", value: 1.5 },
            Row { name: "say \"hi\"", value: 2.0 },
            Row { name: "line\rbreak", value: 3.0 },
        ];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "name,value\n\"b,c\",1.5\n\"say \"\"hi\"\"\",2.0\n\"line\rbreak\",3.0\n"
        );
    }

    #[test]
    fn test_format_opt() {
        assert_eq!(format_opt(Some(2.345), 1), "2.3");
        assert_eq!(format_opt(None, 1), "-");
    }
}
