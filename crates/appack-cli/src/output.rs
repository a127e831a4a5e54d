//! Formatted output helpers for CLI commands.
//!
//! Provides the `inspect` report layout, aligned tables, and human-readable
//! byte formatting.

use std::fmt::Write as _;

use appack_package::inspect::InspectReport;

/// Formats a byte count into a human-readable string (e.g., "128 MiB").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Lays out `rows` under `header` with columns padded to their widest cell.
#[must_use]
pub fn format_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.len());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = header.iter().map(ToString::to_string).collect();
    for row in std::iter::once(&header).chain(rows) {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(&widths) {
            let _ = write!(line, "{cell:<width$}  ");
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Renders the human-readable `inspect` report.
#[must_use]
pub fn format_report(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", report.name, report.version);
    if !report.maintainers.is_empty() {
        let names: Vec<String> = report.maintainers.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "Maintained by: {}", names.join(", "));
    }
    if !report.description.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", report.description);
    }

    let services: Vec<Vec<String>> = report
        .services
        .iter()
        .map(|s| {
            vec![
                s.name.clone(),
                s.replicas.to_string(),
                s.ports.join(","),
                s.image.clone(),
            ]
        })
        .collect();
    section(
        &mut out,
        &format!("Services ({})", services.len()),
        &["Replicas", "Ports", "Image"],
        &services,
    );

    let names = |items: &[String]| -> Vec<Vec<String>> {
        items.iter().map(|n| vec![n.clone()]).collect()
    };
    section(
        &mut out,
        &format!("Networks ({})", report.networks.len()),
        &[],
        &names(&report.networks),
    );
    section(
        &mut out,
        &format!("Volumes ({})", report.volumes.len()),
        &[],
        &names(&report.volumes),
    );

    let parameters: Vec<Vec<String>> = report
        .parameters
        .iter()
        .map(|(k, v)| vec![k.clone(), v.clone()])
        .collect();
    section(
        &mut out,
        &format!("Parameters ({})", parameters.len()),
        &["Value"],
        &parameters,
    );

    let attachments: Vec<Vec<String>> = report
        .attachments
        .iter()
        .map(|(path, size)| vec![path.clone(), format_bytes(*size)])
        .collect();
    section(
        &mut out,
        &format!("Attachments ({})", attachments.len()),
        &["Size"],
        &attachments,
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "Encoding: {}", report.encoding);
    let _ = writeln!(out, "Digest:   {}", report.digest);
    out
}

/// Appends a titled table; empty sections are omitted.
fn section(out: &mut String, title: &str, columns: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    let header: Vec<&str> = std::iter::once(title).chain(columns.iter().copied()).collect();
    let _ = writeln!(out);
    out.push_str(&format_table(&header, rows));
}

#[cfg(test)]
mod tests {
    use appack_common::types::{Encoding, Maintainer};
    use appack_package::inspect::ServiceSummary;

    use super::*;

    #[test]
    fn format_bytes_displays_bytes() {
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn format_bytes_displays_kib() {
        assert_eq!(format_bytes(2048), "2.0 KiB");
    }

    #[test]
    fn format_bytes_displays_mib() {
        assert_eq!(format_bytes(134_217_728), "128.0 MiB");
    }

    #[test]
    fn format_table_pads_columns() {
        let table = format_table(
            &["Name", "Value"],
            &[
                vec!["web_port".into(), "8082".into()],
                vec!["tag".into(), "latest".into()],
            ],
        );
        assert_eq!(
            table,
            "Name      Value\nweb_port  8082\ntag       latest\n"
        );
    }

    fn report() -> InspectReport {
        let package = appack_package::Package::from_documents(
            std::path::Path::new("simple.dockerapp"),
            "version: 1.0.0\nname: simple\n".into(),
            "services: {}\n".into(),
            String::new(),
            Vec::new(),
            Encoding::MultiFile,
        )
        .expect("package");
        InspectReport {
            name: "simple".into(),
            version: "1.1.0-beta1".into(),
            description: "new fancy webapp with microservices".into(),
            maintainers: vec![Maintainer::parse("John Developer:john.dev@example.com")],
            services: vec![ServiceSummary {
                name: "web".into(),
                image: "nginx:latest".into(),
                replicas: 2,
                ports: vec!["8082:80".into()],
            }],
            networks: Vec::new(),
            volumes: Vec::new(),
            parameters: vec![("web_port".into(), "8082".into())],
            attachments: vec![("config.cfg".into(), 2048)],
            encoding: Encoding::MultiFile,
            digest: package.digest(),
        }
    }

    #[test]
    fn report_lists_sections() {
        let text = format_report(&report());
        assert!(text.starts_with("simple 1.1.0-beta1\n"), "got: {text}");
        assert!(text.contains("Maintained by: John Developer <john.dev@example.com>\n"));
        assert!(text.contains("Services (1)  Replicas  Ports    Image\nweb           2         8082:80  nginx:latest\n"), "got: {text}");
        assert!(text.contains("config.cfg       2.0 KiB\n"), "got: {text}");
        assert!(!text.contains("Networks"));
        assert!(text.contains("Digest:   sha256:"));
    }
}
