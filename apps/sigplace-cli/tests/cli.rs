use chrono::NaiveDate;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use sigplace_cli::{info, sign, SignRequest};
use sigplace_core::{AnnotationKind, AnnotationStore, SignaturePad, Size};
use std::fs;
use std::path::Path;

fn write_pdf(path: &Path, page_count: usize) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0 0 m 10 10 l S".to_vec()));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => Object::Reference(content_id),
            }))
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

fn shown_text(pdf: &[u8], page_number: u32) -> Vec<Vec<u8>> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&page_number).unwrap();
    Content::decode(&doc.get_page_content(page_id).unwrap())
        .unwrap()
        .operations
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.into_iter().next() {
            Some(Object::String(bytes, _)) => Some(bytes),
            _ => None,
        })
        .collect()
}

#[test]
fn info_reports_pages() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    write_pdf(&input, 3);

    let document = info(&input).unwrap();
    assert_eq!(document.page_count, 3);
    assert_eq!(document.pages[2].width, 595.0);
    assert_eq!(document.pages[2].height, 842.0);
}

#[test]
fn sign_applies_plan_from_store_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let plan = dir.path().join("plan.json");
    let output = dir.path().join("signed-document.pdf");
    write_pdf(&input, 2);

    let mut pad = SignaturePad::default();
    pad.pointer_down(20.0, 20.0);
    pad.pointer_move(200.0, 120.0);
    pad.pointer_up();

    let mut store = AnnotationStore::new();
    store.add(
        1,
        72.0,
        600.0,
        AnnotationKind::DrawnImage {
            image: pad.save().unwrap(),
            dated: true,
        },
        None,
    );
    store.add(
        2,
        72.0,
        100.0,
        AnnotationKind::Text {
            text: "Approved".to_string(),
            font_size: 12.0,
        },
        Some(Size::new(160.0, 40.0)),
    );
    store.add(
        9,
        0.0,
        0.0,
        AnnotationKind::Placeholder {
            label: "lost".to_string(),
        },
        None,
    );
    fs::write(&plan, store.to_json().unwrap()).unwrap();

    let summary = sign(&SignRequest {
        input,
        plan,
        output: output.clone(),
        config: None,
        date: NaiveDate::from_ymd_opt(2024, 12, 24),
    })
    .unwrap();
    assert_eq!(summary.placed, 2);
    assert_eq!(summary.skipped, 1);

    let signed = fs::read(&output).unwrap();
    assert_eq!(summary.bytes, signed.len());
    assert!(shown_text(&signed, 1).contains(&b"12/24/2024".to_vec()));
    assert!(shown_text(&signed, 2).contains(&b"Approved".to_vec()));
}

#[test]
fn sign_uses_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let plan = dir.path().join("plan.json");
    let config = dir.path().join("sigplace.toml");
    let output = dir.path().join("out.pdf");
    write_pdf(&input, 1);
    fs::write(&config, "date_format = \"%Y-%m-%d\"\n").unwrap();

    let mut store = AnnotationStore::new();
    let image = SignaturePad::default().save().unwrap();
    store.add(1, 10.0, 10.0, AnnotationKind::DrawnImage { image, dated: true }, None);
    fs::write(&plan, store.to_json().unwrap()).unwrap();

    sign(&SignRequest {
        input,
        plan,
        output: output.clone(),
        config: Some(config),
        date: NaiveDate::from_ymd_opt(2024, 2, 29),
    })
    .unwrap();

    assert!(shown_text(&fs::read(&output).unwrap(), 1).contains(&b"2024-02-29".to_vec()));
}

#[test]
fn empty_plan_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let plan = dir.path().join("plan.json");
    write_pdf(&input, 1);
    fs::write(&plan, "[]").unwrap();

    let err = sign(&SignRequest {
        input,
        plan,
        output: dir.path().join("out.pdf"),
        config: None,
        date: None,
    })
    .unwrap_err();
    assert!(err.to_string().contains("no annotations"));
}

#[test]
fn plan_with_repeated_ids_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.pdf");
    let plan = dir.path().join("plan.json");
    let output = dir.path().join("out.pdf");
    write_pdf(&input, 1);
    fs::write(
        &plan,
        r#"[
            {"id":1,"page_number":1,"x":0,"y":0,"width":220,"height":40,"kind":"placeholder","label":"a"},
            {"id":1,"page_number":1,"x":0,"y":100,"width":220,"height":40,"kind":"placeholder","label":"b"}
        ]"#,
    )
    .unwrap();

    let err = sign(&SignRequest {
        input,
        plan,
        output: output.clone(),
        config: None,
        date: None,
    })
    .unwrap_err();
    assert!(format!("{:#}", err).contains("duplicate annotation id 1"));
    assert!(!output.exists());
}

#[test]
fn missing_input_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = info(&dir.path().join("nope.pdf")).unwrap_err();
    assert!(err.to_string().contains("nope.pdf"));
}
