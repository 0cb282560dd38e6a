use outline_model::{TextBlock, TextSpan};
use pdf_structure::section_segmenter::{is_section_header, BlockLine};
use pdf_structure::{
    regex_sentence_split, segment_sections, split_sentences, SegmentError, SegmentParams, SentenceTokenizer,
    UnicodeSentenceTokenizer,
};

fn block(page: u32, text: &str, size: f32, bold: bool) -> TextBlock {
    let mut span = TextSpan::new(text, size, page);
    span.bold = bold;
    TextBlock::new(page, vec![span])
}

fn line(text: &str, size: f32, bold: bool) -> BlockLine {
    BlockLine { text: text.into(), avg_font_size: size, bold, page: 1 }
}

#[test]
fn sections_open_on_headers_and_drop_short_content() {
    let blocks = vec![
        block(1, "front matter before any header", 10.0, false),
        block(1, "Coastal Adventures", 14.0, true),
        block(1, "The coast offers beaches, water sports and nightlife for groups.", 10.0, false),
        block(1, "Nightlife", 10.0, true),
        block(1, "Short.", 10.0, false),
        block(2, "3. Culinary Experiences", 10.0, false),
        block(2, "Cooking classes in Nice teach local recipes", 10.0, false),
        block(2, "using fresh market produce.", 10.0, false),
        block(2, "ok", 10.0, false),
    ];
    let sections = segment_sections(&blocks, "guide.pdf", &SegmentParams::default());
    let got: Vec<(&str, u32)> = sections.iter().map(|s| (s.title.as_str(), s.page)).collect();
    assert_eq!(got, vec![("Coastal Adventures", 1), ("3. Culinary Experiences", 2)]);
    assert_eq!(
        sections[1].content,
        "Cooking classes in Nice teach local recipes using fresh market produce."
    );
    assert!(sections.iter().all(|s| s.document == "guide.pdf"));
}

#[test]
fn block_line_joins_runs_and_averages_sizes() {
    let b = TextBlock::new(
        3,
        vec![
            TextSpan::new(" Packing ", 12.0, 3),
            TextSpan::new("   ", 40.0, 3),
            TextSpan::new("Tips", 14.0, 3).bold(),
        ],
    );
    let l = BlockLine::from_block(&b, 10.0);
    assert_eq!(l.text, "Packing Tips");
    assert_eq!(l.avg_font_size, 13.0);
    assert!(l.bold);
    assert_eq!(BlockLine::from_block(&TextBlock::new(1, vec![]), 10.0).avg_font_size, 10.0);
}

#[test]
fn header_rules() {
    let p = SegmentParams::default();
    assert!(is_section_header(&line("2.1 Getting There", 10.0, false), &p));
    assert!(is_section_header(&line("B) Hotels", 10.0, false), &p));
    assert!(is_section_header(&line("IV. Appendix material", 10.0, false), &p));
    assert!(is_section_header(&line("a bold lowercase line", 10.0, true), &p));
    assert!(is_section_header(&line("large print lowercase", 16.0, false), &p));
    assert!(is_section_header(&line("PACKING LIST", 10.0, false), &p));
    assert!(is_section_header(&line("Family Friendly Hotels", 10.0, false), &p));
    assert!(is_section_header(&line("methodology and data sources", 10.0, false), &p));
    assert!(is_section_header(&line("chapter 7 the south", 10.0, false), &p));
    assert!(!is_section_header(&line("the region is known for its wine and its markets.", 10.0, false), &p));
    assert!(!is_section_header(&line("Tours", 10.0, false), &p));
    let long = format!("1. {}", "x".repeat(160));
    assert!(!is_section_header(&line(&long, 20.0, true), &p));
}

struct FailingTokenizer;

impl SentenceTokenizer for FailingTokenizer {
    fn split(&self, _text: &str) -> Result<Vec<String>, SegmentError> {
        Err(SegmentError::Tokenizer("model data missing".into()))
    }
}

#[test]
fn unicode_tokenizer_splits_sentences() {
    let got = UnicodeSentenceTokenizer.split("Hello there. How are you? Fine!").unwrap();
    assert_eq!(got, vec!["Hello there.", "How are you?", "Fine!"]);
}

#[test]
fn failing_tokenizer_falls_back_to_punctuation_split() {
    let text = "Visit the old port early. Markets close at noon!  Bring cash";
    assert_eq!(
        split_sentences(&FailingTokenizer, text),
        vec!["Visit the old port early.", "Markets close at noon.", "Bring cash."]
    );
    assert_eq!(regex_sentence_split("   "), Vec::<String>::new());
}
