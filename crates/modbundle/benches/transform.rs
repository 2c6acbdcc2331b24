use criterion::{Criterion, criterion_group, criterion_main};
use modbundle::bundler::Bundler;
use modbundle::config::Config;
use modbundle::transform::transform_source;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;

const VIEW: &str = r#"//
//  TaskDetailView.swift
//  TidyNotes
//

import SwiftUI
import Combine


// MARK: - View Implementation

/// Shows a task and its notes
struct TaskDetailView: View {
    @ObservedObject var presenter: TaskDetailPresenter

    var body: some View {
        VStack(spacing: 16) {
            headerView // title and due date
            noteEditorView

            Spacer()
        }
        .padding()
    }
}
"#;

/// Create a project with a few modules and shared files
fn create_test_project(root: &Path) -> std::io::Result<()> {
    for module in ["Auth", "TaskList", "TaskDetail", "Setting"] {
        for screen in ["View", "Interactor", "Router", "Intent"] {
            let dir = root.join("Modules").join(module);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(format!("{module}{screen}.swift")), VIEW)?;
        }
    }
    let shared = root.join("Shared").join("Extension");
    fs::create_dir_all(&shared)?;
    for name in ["ExtString", "ExtDate", "ExtView"] {
        fs::write(shared.join(format!("{name}.swift")), VIEW)?;
    }
    Ok(())
}

fn benchmark_transform(c: &mut Criterion) {
    let large = VIEW.repeat(200);

    c.bench_function("transform_single_file", |b| {
        b.iter(|| transform_source(black_box(VIEW)));
    });

    c.bench_function("transform_large_file", |b| {
        b.iter(|| transform_source(black_box(&large)));
    });
}

fn benchmark_full_run(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path().join("TidyNotes");
    create_test_project(&root).expect("Failed to create test project");

    let config = Config {
        target: root,
        output_dir: temp_dir.path().join("out"),
        ..Config::default()
    };

    c.bench_function("bundle_project", |b| {
        b.iter(|| {
            Bundler::new(black_box(config.clone()))
                .run()
                .expect("Bundling should succeed")
        });
    });
}

criterion_group!(benches, benchmark_transform, benchmark_full_run);
criterion_main!(benches);
