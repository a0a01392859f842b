mod common;

use common::FakeFal;
use falbench::prelude::*;

const MODELS: &[KnownModel] = &[
    KnownModel {
        key: "1",
        endpoint: "m/a",
        description: "Model A",
    },
    KnownModel {
        key: "2",
        endpoint: "m/b",
        description: "Model B",
    },
];

async fn run(fal: &FakeFal, dir: &std::path::Path, input: &str) -> String {
    let generator = Generator::with_output_dir(fal.client(), dir).unwrap();
    let mut session = Session::new(generator, MODELS, input.as_bytes(), Vec::new());
    session.run().await.unwrap();
    return String::from_utf8(session.into_output()).unwrap();
}

#[tokio::test]
async fn run_all_models() {
    let fal = FakeFal::start().await;
    let dir = tempfile::tempdir().unwrap();

    let out = run(&fal, dir.path(), "1\na red bicycle\nall\nbikes\n3\n").await;

    assert!(out.contains("[1/2] Testing a..."), "{out}");
    assert!(out.contains("[2/2] Testing b..."), "{out}");
    assert!(out.contains("Successful: 1/2"), "{out}");
    assert!(out.contains("✅ a\n"), "{out}");
    assert!(out.contains("❌ b\n"), "{out}");
    assert!(out.contains("Failed to generate image"), "{out}");

    let saved = std::fs::read_dir(dir.path().join("bikes")).unwrap().count();
    assert_eq!(saved, 1);
}

#[tokio::test]
async fn default_directory_name() {
    let fal = FakeFal::start().await;
    let dir = tempfile::tempdir().unwrap();

    let out = run(&fal, dir.path(), "1\na red bicycle\n1, 5\n\nq\n").await;
    assert!(out.contains("Invalid model number: 5"), "{out}");
    assert!(out.contains("Successful: 1/1"), "{out}");

    let entries = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|x| x.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("experiment_"), "{entries:?}");
}
