//! End-to-end tests for [`Pipeline`].
//!
//! Every strategy and OCR provider here is a mock from
//! `studyplan_core::mock`, so no PDF library or network is involved.

use std::sync::Arc;

use studyplan_core::mock::{MockBackend, MockOcr, MockPages};
use studyplan_core::{OcrProvider, TextLayerBackend};
use studyplan_ingest::{Document, IngestError, Pipeline, PipelineStage, StatusStore};

fn pdf(id: &str) -> Document {
    Document::from_bytes(id, format!("{id}.pdf"), b"%PDF-1.6 test".to_vec())
}

fn pipeline(strategies: &[Arc<MockBackend>], ocr: &Arc<MockOcr>) -> Pipeline {
    let strategies: Vec<Arc<dyn TextLayerBackend>> = strategies
        .iter()
        .map(|s| s.clone() as Arc<dyn TextLayerBackend>)
        .collect();
    Pipeline::with_strategies(strategies, ocr.clone() as Arc<dyn OcrProvider>)
}

fn book_pages() -> Vec<&'static str> {
    let mut pages = vec!["Lorem ipsum dolor sit amet, consectetur."; 12];
    pages[4] = "Chapter 2\nKinematics describes motion.";
    pages[5] = "Section 2.1\nVelocity and speed.";
    pages[8] = "Chapter 3\nDynamics explains why things move.";
    pages
}

#[tokio::test]
async fn failing_first_strategy_falls_through() {
    // The scanned check reads the first strategy; a failing one sends the
    // document to OCR, so the failure sits second in the chain.
    let padded = Arc::new(MockBackend::new(
        "padded",
        MockPages::Pages(vec![" ".repeat(40), "x".into()]),
    ));
    let broken = Arc::new(MockBackend::failing("broken", "unsupported filter"));
    let good = Arc::new(MockBackend::with_pages("good", &book_pages()));
    let ocr = Arc::new(MockOcr::new("should not be used"));
    let p = pipeline(&[padded, broken.clone(), good.clone()], &ocr);

    let text = p.extract_text(&pdf("physics")).await;
    assert!(text.contains("Kinematics describes motion."));
    assert_eq!(broken.call_count(), 1);
    assert_eq!(ocr.call_count(), 0);
}

#[tokio::test]
async fn sufficient_text_layer_never_calls_ocr() {
    let primary = Arc::new(MockBackend::with_pages("primary", &book_pages()));
    let ocr = Arc::new(MockOcr::new("ocr"));
    let p = pipeline(&[primary], &ocr);
    let doc = pdf("physics");

    p.extract_text(&doc).await;
    let pages = p.extract_pages(&doc).await;
    p.extract_structure(&doc).await;

    assert_eq!(pages.len(), 12);
    assert!(pages.iter().all(|page| !page.ocr));
    assert_eq!(ocr.call_count(), 0);
}

#[tokio::test]
async fn scanned_document_skips_strategies() {
    let primary = Arc::new(MockBackend::with_pages("primary", &["", "", ""]));
    let secondary = Arc::new(MockBackend::with_pages("secondary", &book_pages()));
    let ocr = Arc::new(MockOcr::new("Chapter 1\nRecognized from a scan."));
    let p = pipeline(&[primary.clone(), secondary.clone()], &ocr);

    let text = p.extract_text(&pdf("scan")).await;
    assert_eq!(text, "Chapter 1\nRecognized from a scan.");
    assert_eq!(ocr.call_count(), 1);
    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn ocr_text_is_split_into_page_count_pages() {
    let primary = Arc::new(MockBackend::with_pages("primary", &[""; 10]));
    let ocr = Arc::new(MockOcr::new("z".repeat(1000)));
    let p = pipeline(&[primary], &ocr);

    let pages = p.extract_pages(&pdf("scan")).await;
    assert_eq!(pages.len(), 10);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.page_number, i + 1);
        assert_eq!(page.text.chars().count(), 100);
        assert!(page.ocr);
    }
}

#[tokio::test]
async fn empty_ocr_means_no_pages_and_no_text() {
    let primary = Arc::new(MockBackend::with_pages("primary", &["", ""]));
    let ocr = Arc::new(MockOcr::empty());
    let p = pipeline(&[primary], &ocr);
    let doc = pdf("blank");

    assert!(p.extract_pages(&doc).await.is_empty());
    assert_eq!(p.extract_text(&doc).await, "");
    assert!(p.extract_structure(&doc).await.is_empty());
}

#[tokio::test]
async fn page_list_with_any_text_is_accepted_whole() {
    let primary = Arc::new(MockBackend::with_pages(
        "primary",
        &["Chapter 1 Atoms and molecules", "", "   ", "Matter is made of atoms."],
    ));
    let ocr = Arc::new(MockOcr::new("unused"));
    let p = pipeline(&[primary], &ocr);

    let pages = p.extract_pages(&pdf("chem")).await;
    let numbers: Vec<_> = pages.iter().map(|page| page.page_number).collect();
    assert_eq!(numbers, [1, 2, 3, 4]);
    assert_eq!(pages[2].text, "");
    assert_eq!(ocr.call_count(), 0);
}

#[tokio::test]
async fn structure_from_document_nests_sections() {
    let primary = Arc::new(MockBackend::with_pages("primary", &book_pages()));
    let p = pipeline(&[primary], &Arc::new(MockOcr::empty()));

    let outline = p.extract_structure(&pdf("physics")).await;
    assert_eq!(outline.len(), 2);
    assert_eq!(outline[0].title, "Chapter 2");
    assert_eq!((outline[0].start_page, outline[0].end_page), (5, 8));
    assert_eq!(outline[0].children[0].title, "Section 2.1");
    assert_eq!((outline[1].start_page, outline[1].end_page), (9, 12));
}

#[tokio::test]
async fn structure_from_text_matches_document_entry_point() {
    let p = pipeline(&[], &Arc::new(MockOcr::empty()));
    let text = book_pages().join("\u{0C}");
    let outline = p.extract_structure_from_text(&text);
    assert_eq!(outline.len(), 2);
    assert_eq!(outline[0].end_page, 8);
    assert!(p.extract_structure_from_text("").is_empty());
}

#[tokio::test]
async fn analyze_reports_stats_and_outline() {
    let primary = Arc::new(MockBackend::with_pages("primary", &book_pages()));
    let p = pipeline(&[primary], &Arc::new(MockOcr::empty())).with_chunking(100, 10);

    let analysis = p.analyze(&pdf("physics")).await.unwrap();
    assert_eq!(analysis.document_id, "physics");
    assert_eq!(analysis.page_count, 12);
    assert!(analysis.chunks_count > 1);
    assert_eq!(analysis.chunks.len(), analysis.chunks_count);
    assert_eq!(analysis.avg_chunk_size, analysis.total_length / analysis.chunks_count);
    assert_eq!(analysis.preview, analysis.chunks[0]);
    assert_eq!(analysis.outline.len(), 2);

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["outline"][0]["children"][0]["start_page"], 6);
}

#[tokio::test]
async fn analyze_without_text_fails_and_records_status() {
    let status = StatusStore::new();
    let primary = Arc::new(MockBackend::with_pages("primary", &["", ""]));
    let p = pipeline(&[primary], &Arc::new(MockOcr::empty())).with_status(status.clone());

    let err = p.analyze(&pdf("blank")).await.unwrap_err();
    assert!(matches!(err, IngestError::NoText(_)));
    assert!(matches!(status.get("blank"), Some(PipelineStage::Failed(_))));
}

#[tokio::test]
async fn analyze_rejects_text_that_cleans_to_nothing() {
    // Only page-number lines: enough characters to pass, nothing after cleaning.
    let numbers = (1..=40).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
    let primary = Arc::new(MockBackend::with_pages("primary", &[numbers.as_str()]));
    let p = pipeline(&[primary], &Arc::new(MockOcr::empty()));

    let err = p.analyze(&pdf("numbers")).await.unwrap_err();
    assert!(matches!(err, IngestError::EmptyAfterCleaning));
}

#[tokio::test]
async fn status_ends_done_after_success() {
    let status = StatusStore::new();
    let primary = Arc::new(MockBackend::with_pages("primary", &book_pages()));
    let p = pipeline(&[primary], &Arc::new(MockOcr::empty())).with_status(status.clone());

    p.extract_structure(&pdf("physics")).await;
    assert_eq!(status.get("physics"), Some(PipelineStage::Done));
    assert_eq!(status.clear_finished(), 1);
    assert!(status.is_empty());
}

#[tokio::test]
async fn analyze_path_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lecture-notes.pdf");
    std::fs::write(&path, b"%PDF-1.4 fake").unwrap();

    let primary = Arc::new(MockBackend::with_pages("primary", &book_pages()));
    let p = pipeline(&[primary], &Arc::new(MockOcr::empty()));
    let analysis = p.analyze_path(&path).await.unwrap();
    assert_eq!(analysis.document_id, "lecture-notes");

    let err = p.analyze_path(&dir.path().join("notes.docx")).await.unwrap_err();
    assert!(matches!(err, IngestError::Document(_)));
}

#[tokio::test]
async fn concurrent_documents_are_independent() {
    let primary = Arc::new(MockBackend::with_pages("primary", &book_pages()));
    let p = Arc::new(pipeline(&[primary], &Arc::new(MockOcr::empty())));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let p = p.clone();
            tokio::spawn(async move { p.extract_structure(&pdf(&format!("doc{i}"))).await })
        })
        .collect();

    let mut outlines = Vec::new();
    for h in handles {
        outlines.push(h.await.unwrap());
    }
    assert!(outlines.windows(2).all(|w| w[0] == w[1]));
}
