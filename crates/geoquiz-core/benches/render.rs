use criterion::{black_box, criterion_group, criterion_main, Criterion};

use geoquiz_core::model::Asset;
use geoquiz_core::render::render;
use geoquiz_core::rich_text::RichDocument;

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let small = generate_document(5);
    let large = generate_document(200);
    let assets = generate_assets(200);

    group.bench_function("5_blocks", |b| {
        b.iter(|| render(black_box(&small), black_box(&assets)))
    });

    group.bench_function("200_blocks", |b| {
        b.iter(|| render(black_box(&large), black_box(&assets)))
    });

    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let json = serde_json::to_string(&generate_document(200)).unwrap();

    c.bench_function("deserialize_200_blocks", |b| {
        b.iter(|| serde_json::from_str::<RichDocument>(black_box(&json)).unwrap())
    });
}

fn generate_document(n: usize) -> RichDocument {
    let mut content = Vec::new();
    for i in 0..n {
        content.push(serde_json::json!({
            "nodeType": "paragraph",
            "data": {},
            "content": [
                {"nodeType": "text", "value": format!("Bloco {i} "), "marks": [{"type": "bold"}], "data": {}},
                {
                    "nodeType": "hyperlink",
                    "data": {"uri": format!("https://example.org/{i}")},
                    "content": [{"nodeType": "text", "value": "link", "marks": [], "data": {}}]
                }
            ]
        }));
        if i % 5 == 0 {
            content.push(serde_json::json!({
                "nodeType": "embedded-asset-block",
                "data": {"target": {"sys": {"id": format!("asset-{i}")}}},
                "content": []
            }));
        }
    }
    serde_json::from_value(serde_json::json!({
        "nodeType": "document",
        "data": {},
        "content": content
    }))
    .unwrap()
}

fn generate_assets(n: usize) -> Vec<Asset> {
    (0..n)
        .step_by(10)
        .map(|i| Asset {
            id: format!("asset-{i}"),
            url: format!("//images.ctfassets.net/bench/{i}.png"),
            content_type: "image/png".into(),
            file_name: format!("{i}.png"),
            width: Some(640),
            height: Some(480),
            title: Some(format!("Asset {i}")),
            description: None,
        })
        .collect()
}

criterion_group!(benches, bench_render, bench_deserialize);
criterion_main!(benches);
