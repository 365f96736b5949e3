//! Tests for the text, PDF and extension-dispatching loaders.

use smartpdf_rag::{AutoLoader, Document, DocumentLoader, RagError, TextLoader};

#[test]
fn text_loader_splits_pages_on_form_feed() {
    let document = Document::new("notes.txt", "first page\x0Csecond page\x0C");
    let pages = TextLoader.load(&document).unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].index, 0);
    assert_eq!(pages[0].text, "first page");
    assert_eq!(pages[1].text, "second page");
    assert!(pages[2].text.is_empty());
}

#[test]
fn text_loader_rejects_invalid_utf8() {
    let document = Document::new("binary.txt", vec![0xc3, 0x28, 0xff]);
    let err = TextLoader.load(&document).unwrap_err();

    assert!(matches!(err, RagError::Load { ref document, .. } if document == "binary.txt"));
    assert!(err.is_document_error());
}

#[test]
fn auto_loader_dispatches_by_extension() {
    let markdown = Document::new("README.MD", "# Title\x0Cbody");
    assert_eq!(AutoLoader.load(&markdown).unwrap().len(), 2);

    let unsupported = Document::new("sheet.xlsx", "cells");
    let err = AutoLoader.load(&unsupported).unwrap_err();
    assert!(err.to_string().contains(".xlsx"));

    let bare = Document::new("LICENSE", "text");
    assert!(matches!(AutoLoader.load(&bare), Err(RagError::Load { .. })));
}

#[cfg(feature = "pdf")]
mod pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};
    use smartpdf_rag::{AutoLoader, Document, DocumentLoader, PdfLoader, RagError};

    /// Build a PDF with one page of text per entry in `texts`.
    fn build_pdf(texts: &[&str]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn extracts_text_in_page_order() {
        let bytes = build_pdf(&["Ownership keeps memory safe", "Borrowing avoids copies"]);
        let pages = PdfLoader.load(&Document::new("book.pdf", bytes)).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].index, 0);
        assert_eq!(pages[1].index, 1);
        assert!(pages[0].text.contains("Ownership"));
        assert!(pages[1].text.contains("Borrowing"));
    }

    #[test]
    fn garbage_bytes_are_a_load_error() {
        let err = PdfLoader
            .load(&Document::new("fake.pdf", b"this is not a pdf".to_vec()))
            .unwrap_err();
        assert!(matches!(err, RagError::Load { ref document, .. } if document == "fake.pdf"));
    }

    #[test]
    fn auto_loader_routes_pdf_extension() {
        let bytes = build_pdf(&["Lifetimes annotate references"]);
        let pages = AutoLoader.load(&Document::new("Guide.PDF", bytes)).unwrap();
        assert_eq!(pages.len(), 1);
    }
}
