//! Subcommand implementations.

pub mod attach;
pub mod backup;
pub mod import_delinea;
pub mod import_keeper;
pub mod report_events;
pub mod report_passwords;
pub mod report_permissions;
pub mod tag;

use color_eyre::eyre::Result;

/// Render rows as an ASCII table.
pub(crate) fn table_from_rows<S: AsRef<str>>(header: &[S], rows: &[Vec<String>]) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(header.iter().map(AsRef::as_ref));
    for row in rows {
        builder.push_record(row.iter().map(String::as_str));
    }
    let mut table = builder.build();
    table.with(tabled::settings::Style::ascii());
    table.to_string()
}

/// Write rows to a CSV file with the given header.
pub(crate) fn write_csv<S: AsRef<str>>(
    path: &str,
    header: &[S],
    rows: &[Vec<String>],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header.iter().map(AsRef::as_ref))?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
