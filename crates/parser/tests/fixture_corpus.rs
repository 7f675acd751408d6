use std::path::Path;

use gotype_parser::parse_source;
use walkdir::WalkDir;

fn go_files(root: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("go"))
        .collect();
    files.sort();
    files
}

#[test]
fn every_fixture_parses() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data");
    let files = go_files(&root);
    assert!(!files.is_empty(), "no fixtures under {}", root.display());

    for path in files {
        let src = std::fs::read_to_string(&path).unwrap();
        if let Err(f) = parse_source(&src) {
            panic!("{}: {f}", path.display());
        }
    }
}

/// Runs over an external tree of declaration files when
/// `GOTYPE_PARSER_CORPUS` points at one.
#[test]
fn parses_external_corpus_if_configured() {
    let Some(root) = std::env::var_os("GOTYPE_PARSER_CORPUS") else {
        eprintln!("GOTYPE_PARSER_CORPUS not set; skipping corpus test");
        return;
    };

    let mut total = 0usize;
    for path in go_files(Path::new(&root)) {
        if path.to_string_lossy().contains("testdata") {
            continue;
        }
        let Ok(src) = std::fs::read_to_string(&path) else {
            continue;
        };

        total += 1;
        if let Err(f) = parse_source(&src) {
            eprintln!("FAILED: {}", path.display());
            for d in f.diags.iter().take(8) {
                eprintln!("  {:?} {}: {}", d.kind, d.span, d.message);
            }
            panic!("corpus parse failed after {total} files");
        }
    }

    eprintln!("Parsed {total} files successfully.");
}
