//! Page-level plumbing: resource registration and content stream appending

use crate::document::{inherited_attribute, resolve_dict};
use crate::error::SignError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Named resources a page's new content refers to
#[derive(Debug, Default)]
pub(crate) struct PageResources {
    fonts: Vec<(String, ObjectId)>,
    ext_gstates: Vec<(String, ObjectId)>,
    xobjects: Vec<(String, ObjectId)>,
}

impl PageResources {
    pub fn font(&mut self, name: &str, id: ObjectId) {
        push_unique(&mut self.fonts, name, id);
    }

    pub fn ext_gstate(&mut self, name: &str, id: ObjectId) {
        push_unique(&mut self.ext_gstates, name, id);
    }

    pub fn xobject(&mut self, name: &str, id: ObjectId) {
        push_unique(&mut self.xobjects, name, id);
    }
}

fn push_unique(entries: &mut Vec<(String, ObjectId)>, name: &str, id: ObjectId) {
    if !entries.iter().any(|(n, _)| n == name) {
        entries.push((name.to_string(), id));
    }
}

/// Append `operations` to a page as a new content stream.
///
/// The existing content is bracketed with `q`/`Q` so whatever graphics state
/// it leaves behind does not affect the new drawing.
pub(crate) fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
    resources: &PageResources,
) -> Result<(), SignError> {
    let merged = merged_resources(doc, page_id, resources);

    let encoded = Content { operations }
        .encode()
        .map_err(|e| SignError::Operation(format!("Failed to encode content: {}", e)))?;
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    let existing = existing_content_refs(doc, page_id)?;

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| SignError::Operation(e.to_string()))?;

    let mut contents = Vec::with_capacity(existing.len() + 3);
    if !existing.is_empty() {
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(restore_id));
    }
    contents.push(Object::Reference(overlay_id));

    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(merged));
    Ok(())
}

/// Current `Contents` of a page as a list of stream references
fn existing_content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, SignError> {
    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| SignError::Operation(e.to_string()))?;

    let refs = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            // An indirect array of streams
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    Ok(refs)
}

/// The page's effective resources (inherited ones copied down) with the new
/// entries added under their categories
fn merged_resources(doc: &Document, page_id: ObjectId, add: &PageResources) -> Dictionary {
    let mut merged = inherited_attribute(doc, page_id, b"Resources")
        .and_then(|obj| resolve_dict(doc, obj))
        .cloned()
        .unwrap_or_else(Dictionary::new);

    for (category, entries) in [
        ("Font", &add.fonts),
        ("ExtGState", &add.ext_gstates),
        ("XObject", &add.xobjects),
    ] {
        if entries.is_empty() {
            continue;
        }
        let mut sub = merged
            .get(category.as_bytes())
            .ok()
            .and_then(|obj| resolve_dict(doc, obj))
            .cloned()
            .unwrap_or_else(Dictionary::new);
        for (name, id) in entries {
            sub.set(name.as_str(), Object::Reference(*id));
        }
        merged.set(category, Object::Dictionary(sub));
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_pdf;
    use lopdf::dictionary;

    fn first_page(doc: &Document) -> ObjectId {
        *doc.get_pages().get(&1).unwrap()
    }

    #[test]
    fn test_append_wraps_original_content() {
        let mut doc = Document::load_mem(&test_pdf::letter(1)).unwrap();
        let page_id = first_page(&doc);

        append_content(
            &mut doc,
            page_id,
            vec![Operation::new("S", vec![])],
            &PageResources::default(),
        )
        .unwrap();

        let content = doc.get_page_content(page_id).unwrap();
        let ops: Vec<_> = Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect();
        assert_eq!(ops.first().map(String::as_str), Some("q"));
        let q_end = ops.iter().position(|op| op == "Q").unwrap();
        assert!(ops[..q_end].iter().any(|op| op == "Tj"));
        assert_eq!(ops.last().map(String::as_str), Some("S"));
    }

    #[test]
    fn test_inherited_resources_are_copied_down() {
        let mut doc = Document::load_mem(&test_pdf::letter(1)).unwrap();
        let page_id = first_page(&doc);
        let font_id = doc.add_object(dictionary! { "Type" => "Font" });

        let mut resources = PageResources::default();
        resources.font("SpHelv", font_id);
        append_content(&mut doc, page_id, vec![], &resources).unwrap();

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let fonts = page
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Font")
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(fonts.has(b"F1"));
        assert_eq!(fonts.get(b"SpHelv").unwrap().as_reference().unwrap(), font_id);
    }
}
