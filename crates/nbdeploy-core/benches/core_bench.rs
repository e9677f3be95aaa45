//! Criterion benchmarks for nbdeploy-core.
//!
//! Only the offline stages are measured: notebook loading, element
//! extraction, reply parsing and equivalence checking. No network, no
//! filesystem.
//!
//! ```sh
//! cargo bench --manifest-path crates/nbdeploy-core/Cargo.toml
//! # Only the extraction group:
//! cargo bench --manifest-path crates/nbdeploy-core/Cargo.toml -- extract
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use nbdeploy_core::extract::extract_code_elements;
use nbdeploy_core::grouping::parse_grouping;
use nbdeploy_core::notebook::source_from_json;
use nbdeploy_core::verify::check_equivalence;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Python source with `n` functions and `n` classes, plus a few imports.
fn synthetic_source(n: usize) -> String {
    let mut src = String::from("import os\nimport json as j\nfrom typing import List, Dict\n\n");
    for i in 0..n {
        src.push_str(&format!(
            "def func_{i}(x, y=1):\n    \"\"\"Doc {i}.\"\"\"\n    return x + y + {i}\n\n"
        ));
        src.push_str(&format!(
            "class Model{i}:\n    def __init__(self):\n        self.v = {i}\n\n    def get(self):\n        return self.v\n\n"
        ));
    }
    src
}

/// nbformat 4 document with one code cell per element pair.
fn synthetic_notebook(n: usize) -> String {
    let cells: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "cell_type": "code",
                "execution_count": null,
                "metadata": {},
                "outputs": [],
                "source": [format!("def f_{i}():\n"), format!("    return {i}\n")],
            })
        })
        .collect();
    serde_json::json!({ "nbformat": 4, "nbformat_minor": 5, "metadata": {}, "cells": cells })
        .to_string()
}

fn synthetic_reply(n: usize, per_file: usize) -> String {
    let mut files = serde_json::Map::new();
    let names: Vec<String> = (0..n).map(|i| format!("func_{i}")).collect();
    for (idx, chunk) in names.chunks(per_file.max(1)).enumerate() {
        files.insert(
            format!("module_{idx}.py"),
            serde_json::json!({ "description": format!("Module {idx}."), "content": chunk }),
        );
    }
    serde_json::Value::Object(files).to_string()
}

// ---------------------------------------------------------------------------
// Benchmark: notebook loading
// ---------------------------------------------------------------------------

fn bench_notebook(c: &mut Criterion) {
    let mut group = c.benchmark_group("notebook");
    for cells in [10, 100, 1000] {
        let json = synthetic_notebook(cells);
        group.bench_with_input(BenchmarkId::new("source_from_json", cells), &json, |b, json| {
            b.iter(|| black_box(source_from_json(json).unwrap()));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: element extraction
// ---------------------------------------------------------------------------

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    for n in [10, 100, 500] {
        let src = synthetic_source(n);
        group.bench_with_input(BenchmarkId::new("extract_code_elements", n), &src, |b, src| {
            b.iter(|| black_box(extract_code_elements(src).unwrap()));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: reply parsing and equivalence
// ---------------------------------------------------------------------------

fn bench_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping");

    let reply = synthetic_reply(500, 10);
    group.bench_function("parse_grouping_500", |b| {
        b.iter(|| black_box(parse_grouping(&reply).unwrap()));
    });

    let actual: Vec<String> = (0..5000).map(|i| format!("name_{i}")).collect();
    let mut proposed = actual.clone();
    proposed.reverse();
    group.bench_function("check_equivalence_5000_match", |b| {
        b.iter(|| {
            check_equivalence(
                actual.iter().map(String::as_str),
                proposed.iter().map(String::as_str),
            )
            .unwrap();
        });
    });

    let mut skewed = proposed.clone();
    skewed.truncate(4000);
    skewed.push("ghost".to_string());
    group.bench_function("check_equivalence_5000_mismatch", |b| {
        b.iter(|| {
            black_box(
                check_equivalence(
                    actual.iter().map(String::as_str),
                    skewed.iter().map(String::as_str),
                )
                .is_err(),
            )
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Register all benchmark groups
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_notebook, bench_extract, bench_grouping);
criterion_main!(benches);
