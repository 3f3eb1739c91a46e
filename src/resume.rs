// SPDX-License-Identifier: PMPL-1.0-or-later
//! Resume file loading with a generated placeholder

use crate::config::ResumeConfig;
use std::io;
use std::path::Path;
use tracing::info;

/// Read the resume, writing a placeholder first when the file is missing.
pub async fn load_or_create(config: &ResumeConfig) -> io::Result<Vec<u8>> {
    match tokio::fs::read(&config.path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let bytes = placeholder_pdf(&config.owner_name, &config.path);
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(&config.path, &bytes).await?;
            info!(path = %config.path.display(), "Created placeholder resume");
            Ok(bytes)
        }
        Err(e) => Err(e),
    }
}

/// Single-page PDF naming the owner and where the real file belongs.
///
/// Output depends only on the arguments. Object offsets in the xref table
/// are computed from the generated body.
pub fn placeholder_pdf(owner_name: &str, expected_path: &Path) -> Vec<u8> {
    let lines = [
        format!("{} - Resume", owner_name),
        "Please upload your actual resume PDF to:".to_string(),
        expected_path.display().to_string(),
    ];

    let mut content = String::from("BT\n/F1 12 Tf\n");
    for (i, line) in lines.iter().enumerate() {
        let y = 700 - (i as i32) * 50;
        content.push_str(&format!("1 0 0 1 100 {} Tm\n({}) Tj\n", y, escape_pdf_text(line)));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_start = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_start
    ));

    pdf.into_bytes()
}

fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_placeholder_is_deterministic() {
        let path = PathBuf::from("static/resume.pdf");
        let a = placeholder_pdf("Ada Lovelace", &path);
        let b = placeholder_pdf("Ada Lovelace", &path);
        assert_eq!(a, b);
        assert!(a.starts_with(b"%PDF-1.4"));
        assert!(a.ends_with(b"%%EOF\n"));

        let text = String::from_utf8(a).unwrap();
        assert!(text.contains("(Ada Lovelace - Resume) Tj"));
        assert!(text.contains("(static/resume.pdf) Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = String::from_utf8(placeholder_pdf("Owner", Path::new("r.pdf"))).unwrap();
        let xref_at = pdf.find("xref\n").unwrap();
        let entries: Vec<usize> = pdf[xref_at..]
            .lines()
            .skip(3)
            .take(5)
            .map(|l| l[..10].parse().unwrap())
            .collect();

        for (i, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }

        let startxref: usize = pdf
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_at);
    }

    #[test]
    fn test_escapes_parentheses() {
        assert_eq!(escape_pdf_text("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_pdf_text("José"), "Jos?");
    }

    #[tokio::test]
    async fn test_missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResumeConfig {
            path: dir.path().join("static").join("resume.pdf"),
            ..Default::default()
        };

        let bytes = load_or_create(&config).await.unwrap();
        assert!(config.path.exists());
        assert_eq!(std::fs::read(&config.path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_existing_file_is_served_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.7 real resume").unwrap();
        let config = ResumeConfig {
            path,
            ..Default::default()
        };

        let bytes = load_or_create(&config).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7 real resume");
    }
}
