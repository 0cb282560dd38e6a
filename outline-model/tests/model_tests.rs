use outline_model::{
    CollectionInput, DocumentLayout, ExtractedSection, Outline, OutlineEntry, RelevanceReport,
    ReportMetadata, SubsectionSnippet, TextBlock, TextSpan,
};
use serde_json::json;

#[test]
fn outline_serializes_with_expected_keys() {
    let outline = Outline {
        title: "Guide".into(),
        outline: vec![OutlineEntry { level: "H2".into(), text: "2.1 Scope".into(), page: 3, language: "en".into() }],
    };
    let value = serde_json::to_value(&outline).unwrap();
    assert_eq!(
        value,
        json!({"title": "Guide", "outline": [{"level": "H2", "text": "2.1 Scope", "page": 3, "language": "en"}]})
    );
}

#[test]
fn untitled_outline_is_empty() {
    let value = serde_json::to_value(Outline::untitled()).unwrap();
    assert_eq!(value, json!({"title": "Untitled", "outline": []}));
}

#[test]
fn report_serializes_with_expected_sections() {
    let report = RelevanceReport {
        metadata: ReportMetadata {
            input_documents: vec!["a.pdf".into()],
            persona: "Travel Planner".into(),
            job_to_be_done: "Plan a trip".into(),
            timestamp: "2025-07-10T12:34:56Z".into(),
        },
        extracted_sections: vec![ExtractedSection {
            document: "a.pdf".into(),
            page: 2,
            section_title: "Coastal Adventures".into(),
            importance_rank: 1,
        }],
        sub_section_analysis: vec![SubsectionSnippet {
            document: "a.pdf".into(),
            page: 2,
            refined_text: "Beach hopping is popular.".into(),
        }],
    };
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["metadata"]["job_to_be_done"], "Plan a trip");
    assert_eq!(value["extracted_sections"][0]["importance_rank"], 1);
    assert_eq!(value["extracted_sections"][0]["section_title"], "Coastal Adventures");
    assert_eq!(value["sub_section_analysis"][0]["refined_text"], "Beach hopping is popular.");
}

#[test]
fn collection_input_ignores_unknown_fields() {
    let raw = r#"{
        "challenge_info": {"challenge_id": "round_1b_002", "test_case_name": "travel_planner"},
        "documents": [{"filename": "South of France - Cities.pdf", "title": "Cities"}, {"filename": "b.pdf"}],
        "persona": {"role": "Travel Planner"},
        "job_to_be_done": {"task": "Plan a trip of 4 days for a group of 10 college friends."}
    }"#;
    let input: CollectionInput = serde_json::from_str(raw).unwrap();
    assert_eq!(input.persona.role, "Travel Planner");
    assert_eq!(input.filenames(), vec!["South of France - Cities.pdf", "b.pdf"]);
    assert_eq!(input.documents[1].title, None);
}

#[test]
fn layout_flattens_spans_in_block_order() {
    let layout = DocumentLayout {
        page_count: 2,
        blocks: vec![
            TextBlock::new(1, vec![TextSpan::new("Heading", 18.0, 1), TextSpan::new("Body", 10.0, 1)]),
            TextBlock::new(2, vec![TextSpan::new("Next", 10.0, 2)]),
        ],
    };
    let texts: Vec<&str> = layout.spans().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Heading", "Body", "Next"]);
    assert_eq!(layout.span_count(), 3);
    assert!(!layout.is_empty());
}
