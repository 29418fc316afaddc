//! Integration tests for the `info` subcommand.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cmd() -> Command {
    Command::cargo_bin("pdfsnip").unwrap()
}

/// Create a PDF with `count` pages, each 612x792 with a small filled square.
fn pdf_with_pages(count: usize) -> Vec<u8> {
    pdf_with_pages_rotated(count, None)
}

/// Same as [`pdf_with_pages`], optionally stamping a /Rotate entry on every
/// page.
fn pdf_with_pages_rotated(count: usize, rotate: Option<i64>) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = lopdf::Document::with_version("1.5");

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];

    let mut page_ids = Vec::new();
    for _ in 0..count {
        let content = b"1 0 0 rg 100 600 50 50 re f".to_vec();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "MediaBox" => media_box.clone(),
            "Contents" => Object::Reference(content_id),
        };
        if let Some(degrees) = rotate {
            page_dict.set("Rotate", Object::Integer(degrees));
        }
        page_ids.push(doc.add_object(page_dict));
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(count as i64),
    });

    for &pid in &page_ids {
        if let Ok(page_obj) = doc.get_object_mut(pid) {
            if let Ok(dict) = page_obj.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write PDF bytes to a temporary file and return the handle.
fn write_temp_pdf(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

// --- Text output tests ---

#[test]
fn info_shows_page_count() {
    let f = write_temp_pdf(&pdf_with_pages(2));

    cmd()
        .args(["info", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pages: 2"));
}

#[test]
fn info_shows_page_dimensions() {
    let f = write_temp_pdf(&pdf_with_pages(1));

    cmd()
        .args(["info", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("612.00 x 792.00"));
}

#[test]
fn info_lists_every_page() {
    let f = write_temp_pdf(&pdf_with_pages(3));

    cmd()
        .args(["info", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Page 1:"))
        .stdout(predicate::str::contains("Page 2:"))
        .stdout(predicate::str::contains("Page 3:"));
}

#[test]
fn info_shows_rotation() {
    let f = write_temp_pdf(&pdf_with_pages_rotated(1, Some(90)));

    cmd()
        .args(["info", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("rotation 90"));
}

// --- JSON output tests ---

#[test]
fn info_json_outputs_valid_json() {
    let f = write_temp_pdf(&pdf_with_pages(1));

    let output = cmd()
        .args(["info", f.path().to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(v.is_object());
}

#[test]
fn info_json_has_required_fields() {
    let f = write_temp_pdf(&pdf_with_pages(2));

    let output = cmd()
        .args(["info", f.path().to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(v["pages"].as_u64().unwrap(), 2);
    assert_eq!(v["page_info"].as_array().unwrap().len(), 2);
}

#[test]
fn info_json_page_entries_are_complete() {
    let f = write_temp_pdf(&pdf_with_pages(1));

    let output = cmd()
        .args(["info", f.path().to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let page = &v["page_info"][0];
    assert_eq!(page["page"].as_u64().unwrap(), 1);
    assert_eq!(page["width"].as_f64().unwrap(), 612.0);
    assert_eq!(page["height"].as_f64().unwrap(), 792.0);
    assert_eq!(page["rotation"].as_i64().unwrap(), 0);
}

#[test]
fn info_json_reports_rotation() {
    let f = write_temp_pdf(&pdf_with_pages_rotated(1, Some(270)));

    let output = cmd()
        .args(["info", f.path().to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(v["page_info"][0]["rotation"].as_i64().unwrap(), 270);
}

// --- Error handling tests ---

#[test]
fn info_file_not_found_error() {
    cmd()
        .args(["info", "nonexistent_file.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn info_invalid_pdf_error() {
    let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    f.write_all(b"this is not a pdf").unwrap();
    f.flush().unwrap();

    cmd()
        .args(["info", f.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn info_exit_code_zero_on_success() {
    let f = write_temp_pdf(&pdf_with_pages(1));

    cmd()
        .args(["info", f.path().to_str().unwrap()])
        .assert()
        .success()
        .code(0);
}
