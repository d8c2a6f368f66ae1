use std::fs;

use jackc::processor::vm::VmWriter;
use jackc::{CompileError, SymbolError, compile_source};

fn compile_to_text(source: &str) -> String {
    let class = compile_source(source).expect("fixture compiles");
    let mut writer = VmWriter::new(Vec::<u8>::new());
    writer.write_all(&class.instructions).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

#[test]
fn compiles_fixtures_to_expected_vm() {
    let test_cases = vec![
        ("tests/fixtures/Main.jack", "tests/fixtures/Main.vm"),
        ("tests/fixtures/Point.jack", "tests/fixtures/Point.vm"),
    ];

    for (source, expected) in test_cases {
        let source = fs::read_to_string(source).unwrap();
        let expected = fs::read_to_string(expected).unwrap();
        assert_eq!(compile_to_text(&source), expected);
    }
}

#[test]
fn output_is_deterministic() {
    let source = fs::read_to_string("tests/fixtures/Main.jack").unwrap();
    assert_eq!(compile_to_text(&source), compile_to_text(&source));
}

#[test]
fn broken_fixture_reports_undefined_name() {
    let source = fs::read_to_string("tests/fixtures/Broken.jack").unwrap();
    match compile_source(&source) {
        Err(CompileError::Symbol { line, source }) => {
            assert_eq!(line, 3);
            assert_eq!(source, SymbolError::Undefined("y".into()));
        }
        other => panic!("expected symbol error, got {other:?}"),
    }
}
