//! Benchmarks for the extraction and replacement pipeline on generated
//! documents:
//! - Simple: 1 page, one paragraph
//! - Medium: 10 pages, several paragraphs per page

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pdfreplace::{EngineConfig, Pdf, ReplaceRequest, replace_text};

const PARAGRAPH: [&str; 4] = [
    "Invoice number 2024-118 issued to Jane Doe",
    "Payment is due within thirty days of receipt",
    "Contact billing for questions about this invoice",
    "Thank you for your business, Jane Doe",
];

/// `pages` US Letter pages, each with `paragraphs` copies of [`PARAGRAPH`]
/// in Helvetica 11pt.
fn build_pdf(pages: usize, paragraphs: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for _ in 0..pages {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 11.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![72.into(), 740.into()]),
        ];
        for _ in 0..paragraphs {
            for line in PARAGRAPH {
                ops.push(Operation::new("Tj", vec![Object::string_literal(line)]));
                ops.push(Operation::new("T*", vec![]));
            }
            ops.push(Operation::new("T*", vec![]));
        }
        ops.push(Operation::new("ET", vec![]));
        let content = Content { operations: ops }.encode().expect("encode content");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save PDF");
    out
}

fn bench_page_extraction(c: &mut Criterion) {
    let simple = build_pdf(1, 1);
    let medium = build_pdf(10, 8);

    let mut group = c.benchmark_group("page_extraction");
    group.bench_function("simple_1page", |b| {
        b.iter(|| {
            let pdf = Pdf::open(black_box(&simple)).unwrap();
            let page = pdf.page(0).unwrap();
            black_box(page.words().len());
        });
    });
    group.bench_function("medium_10page", |b| {
        b.iter(|| {
            let pdf = Pdf::open(black_box(&medium)).unwrap();
            for page in pdf.pages_iter() {
                black_box(page.unwrap().text_runs().len());
            }
        });
    });
    group.finish();
}

fn bench_replace(c: &mut Criterion) {
    let simple = build_pdf(1, 1);
    let medium = build_pdf(10, 8);
    let config = EngineConfig::isolated(Vec::new());

    let mut group = c.benchmark_group("replace");
    let request = ReplaceRequest::new("Jane Doe", "John Smith");
    group.bench_function("simple_1page", |b| {
        b.iter(|| replace_text(black_box(&simple), &request, &config).unwrap());
    });
    group.bench_function("medium_10page", |b| {
        b.iter(|| replace_text(black_box(&medium), &request, &config).unwrap());
    });
    let partial = ReplaceRequest::new("invoic", "receipt");
    group.bench_function("word_expansion_10page", |b| {
        b.iter(|| replace_text(black_box(&medium), &partial, &config).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_page_extraction, bench_replace);
criterion_main!(benches);
