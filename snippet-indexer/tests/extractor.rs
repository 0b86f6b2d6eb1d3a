//! End-to-end extraction over single files.

use snippet_indexer::extract::content_hash;
use snippet_indexer::{ParserConfig, SnippetKind, parse_file};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

const CALC_PY: &str = r#"class Calculator:
    def add(self, a, b):
        """Adds two numbers."""
        return a + b

def free_fn():
    return 1
"#;

#[test]
fn python_class_method_and_free_function() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "calc.py", CALC_PY);

    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    assert!(result.is_successful(), "errors: {:?}", result.errors);
    assert_eq!(result.snippets.len(), 3);

    let class = &result.snippets[0];
    assert_eq!(class.kind, SnippetKind::CodeClass);
    assert_eq!(class.name, "Calculator");
    assert_eq!(class.line_start, 1);
    assert_eq!(class.line_end, 4);

    let method = &result.snippets[1];
    assert_eq!(method.kind, SnippetKind::CodeMethod);
    assert_eq!(method.name, "add");
    assert_eq!(method.class_name, "Calculator");
    assert_eq!(method.args, "(self, a, b)");
    assert!(method.comment.contains("Adds two numbers"));
    assert_eq!(method.line_start, 2);
    assert_eq!(method.line_end, 4);

    let free = &result.snippets[2];
    assert_eq!(free.kind, SnippetKind::CodeFunction);
    assert_eq!(free.name, "free_fn");
    assert_eq!(free.class_name, "");
    assert_eq!(free.line_start, 6);
    assert_eq!(free.line_end, 7);

    let tokens: Vec<&str> = method.keywords.split(' ').collect();
    for expected in ["add", "self", "Adds", "two", "numbers", "calc"] {
        assert!(tokens.contains(&expected), "missing {expected} in {tokens:?}");
    }
}

#[test]
fn method_class_ranges_nest_and_hashes_match() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "calc.py", CALC_PY);
    let result = parse_file(&path, &ParserConfig::default()).unwrap();

    for s in &result.snippets {
        assert!(s.line_start >= 1);
        assert!(s.line_start <= s.line_end);
        assert_eq!(s.content_hash, content_hash(&s.code));
    }

    // Every method's class encloses it.
    for m in result
        .snippets
        .iter()
        .filter(|s| s.kind == SnippetKind::CodeMethod)
    {
        let class = result
            .snippets
            .iter()
            .find(|c| c.kind == SnippetKind::CodeClass && c.name == m.class_name)
            .expect("enclosing class emitted");
        assert!(class.line_start <= m.line_start);
        assert!(class.line_end >= m.line_end);
    }

    // Per-file order is ascending (line_start, line_end).
    let mut prev = (0usize, 0usize);
    for s in &result.snippets {
        assert!((s.line_start, s.line_end) >= prev);
        prev = (s.line_start, s.line_end);
    }
}

#[test]
fn parsing_twice_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "calc.py", CALC_PY);
    let cfg = ParserConfig::default();

    let a = parse_file(&path, &cfg).unwrap();
    let b = parse_file(&path, &cfg).unwrap();

    assert_eq!(a.snippets.len(), b.snippets.len());
    for (x, y) in a.snippets.iter().zip(b.snippets.iter()) {
        assert_eq!(x.name, y.name);
        assert_eq!(x.code, y.code);
        assert_eq!(x.content_hash, y.content_hash);
        assert_eq!(x.keywords, y.keywords);
        assert_eq!((x.line_start, x.line_end), (y.line_start, y.line_end));
    }
}

#[test]
fn nested_classes_attribute_methods_to_the_innermost() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "nested.py",
        "class A:\n    class B:\n        def m(self):\n            pass\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();

    let m = result
        .snippets
        .iter()
        .find(|s| s.name == "m")
        .expect("method m extracted");
    assert_eq!(m.kind, SnippetKind::CodeMethod);
    assert_eq!(m.class_name, "B");

    let classes: Vec<&str> = result
        .snippets
        .iter()
        .filter(|s| s.kind == SnippetKind::CodeClass)
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(classes, vec!["A", "B"]);
}

#[test]
fn nested_function_outside_a_class_stays_a_function() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "outer.py",
        "def outer():\n    def inner():\n        return 2\n    return inner\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    let inner = result.snippets.iter().find(|s| s.name == "inner").unwrap();
    assert_eq!(inner.kind, SnippetKind::CodeFunction);
    assert_eq!(inner.class_name, "");
}

#[test]
fn go_structs_become_classes_and_functions_keep_args() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "server.go",
        "package main\n\ntype Server struct {\n\tAddr string\n}\n\nfunc ServeHTTP(w ResponseWriter, r *Request) {\n\treturn\n}\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();

    let class = result
        .snippets
        .iter()
        .find(|s| s.kind == SnippetKind::CodeClass)
        .expect("struct as class");
    assert_eq!(class.name, "Server");

    let func = result
        .snippets
        .iter()
        .find(|s| s.kind == SnippetKind::CodeFunction)
        .expect("function extracted");
    assert_eq!(func.name, "ServeHTTP");
    assert_eq!(func.args, "(w ResponseWriter, r *Request)");
    assert_eq!(func.class_name, "");
}

#[test]
fn javascript_comments_methods_and_anonymous_arrows() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "app.js",
        "// Adds numbers.\nfunction add(a, b) {\n  return a + b;\n}\n\nclass Greeter {\n  greet(name) {\n    return 'hi ' + name;\n  }\n}\n\nconst anon = (x) => x + 1;\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();

    let add = result.snippets.iter().find(|s| s.name == "add").unwrap();
    assert_eq!(add.kind, SnippetKind::CodeFunction);
    assert_eq!(add.args, "(a, b)");
    assert_eq!(add.comment, "Adds numbers.");

    let greet = result.snippets.iter().find(|s| s.name == "greet").unwrap();
    assert_eq!(greet.kind, SnippetKind::CodeMethod);
    assert_eq!(greet.class_name, "Greeter");

    // The anonymous arrow is skipped; nothing is named after its parameter.
    assert!(result.snippets.iter().all(|s| s.name != "x" && s.name != "anon"));
}

#[test]
fn tsx_files_parse_jsx_under_the_tsx_grammar() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "App.tsx",
        "function App() {\n  return <div>hello</div>;\n}\n\nclass Panel extends React.Component {\n  render() {\n    return <span>ok</span>;\n  }\n}\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    assert!(result.is_successful(), "errors: {:?}", result.errors);
    assert_eq!(result.language, Some(snippet_indexer::Language::Tsx));

    let app = result
        .snippets
        .iter()
        .find(|s| s.name == "App")
        .expect("JSX-bearing function extracted");
    assert_eq!(app.kind, SnippetKind::CodeFunction);

    let render = result.snippets.iter().find(|s| s.name == "render").unwrap();
    assert_eq!(render.kind, SnippetKind::CodeMethod);
    assert_eq!(render.class_name, "Panel");
}

#[test]
fn java_javadoc_attaches_to_the_class() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "Greeter.java",
        "/** Greets people. */\npublic class Greeter {\n    public String greet(String name) {\n        return \"hi \" + name;\n    }\n}\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();

    let class = result
        .snippets
        .iter()
        .find(|s| s.kind == SnippetKind::CodeClass)
        .unwrap();
    assert_eq!(class.name, "Greeter");
    assert_eq!(class.comment, "Greets people.");

    let method = result
        .snippets
        .iter()
        .find(|s| s.kind == SnippetKind::CodeMethod)
        .unwrap();
    assert_eq!(method.name, "greet");
    assert_eq!(method.class_name, "Greeter");
    assert_eq!(method.args, "(String name)");
}

#[test]
fn c_forward_declarations_do_not_become_classes() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "point.c",
        "struct Point {\n  int x;\n  int y;\n};\n\nstruct Point origin;\n\nint add(int a, int b) {\n  return a + b;\n}\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();

    let classes: Vec<&snippet_indexer::Snippet> = result
        .snippets
        .iter()
        .filter(|s| s.kind == SnippetKind::CodeClass)
        .collect();
    assert_eq!(classes.len(), 1, "only the definition counts");
    assert_eq!(classes[0].name, "Point");

    let add = result.snippets.iter().find(|s| s.name == "add").unwrap();
    assert_eq!(add.kind, SnippetKind::CodeFunction);
    assert_eq!(add.args, "(int a, int b)");
}

#[test]
fn lua_functions_are_extracted() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "greet.lua",
        "-- Says hello.\nfunction greet(name)\n  return 'hi ' .. name\nend\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    let greet = result
        .snippets
        .iter()
        .find(|s| s.name == "greet")
        .expect("lua function extracted");
    assert_eq!(greet.kind, SnippetKind::CodeFunction);
}

#[test]
fn comment_separated_by_a_blank_line_is_not_attached() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "gap.py",
        "# stale note\n\ndef f():\n    return 1\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    let f = result.snippets.iter().find(|s| s.name == "f").unwrap();
    assert_eq!(f.comment, "");

    let path = write_file(
        &dir,
        "tight.py",
        "# first line\n# second line\ndef g():\n    return 1\n",
    );
    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    let g = result.snippets.iter().find(|s| s.name == "g").unwrap();
    assert_eq!(g.comment, "first line\nsecond line");
}

#[test]
fn oversize_files_fail_the_size_gate() {
    let dir = TempDir::new().unwrap();
    let big = "function f() { return 1; }\n".repeat(64);
    let path = write_file(&dir, "big.js", &big);

    let cfg = ParserConfig {
        max_file_size: 128,
        ..Default::default()
    };
    let result = parse_file(&path, &cfg).unwrap();
    assert!(!result.is_successful());
    assert!(result.snippets.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("too large"), "{:?}", result.errors);
}

#[test]
fn private_methods_can_be_dropped() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "svc.py",
        "class Svc:\n    def run(self):\n        return 1\n    def _hidden(self):\n        return 2\n",
    );

    let default_result = parse_file(&path, &ParserConfig::default()).unwrap();
    assert!(default_result.snippets.iter().any(|s| s.name == "_hidden"));

    let cfg = ParserConfig {
        ignore_private_methods: true,
        ..Default::default()
    };
    let filtered = parse_file(&path, &cfg).unwrap();
    assert!(filtered.snippets.iter().all(|s| s.name != "_hidden"));
    assert!(filtered.snippets.iter().any(|s| s.name == "run"));
}

#[test]
fn function_line_span_filter_applies_to_callables_only() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "spans.py",
        "class K:\n    def tiny(self): return 1\n    def wide(self):\n        a = 1\n        b = 2\n        return a + b\n",
    );
    let cfg = ParserConfig {
        min_function_lines: 3,
        ..Default::default()
    };
    let result = parse_file(&path, &cfg).unwrap();

    assert!(result.snippets.iter().any(|s| s.kind == SnippetKind::CodeClass));
    assert!(result.snippets.iter().all(|s| s.name != "tiny"));
    assert!(result.snippets.iter().any(|s| s.name == "wide"));
}

#[test]
fn unknown_extension_reports_no_language() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.xyz", "some text\n");
    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    assert!(result.language.is_none());
    assert!(result.snippets.is_empty());
    assert!(!result.is_successful());
}

#[test]
fn file_metadata_records_size_and_encoding() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "m.py", "def f():\n    return 1\n");
    let result = parse_file(&path, &ParserConfig::default()).unwrap();
    assert_eq!(
        result.metadata.get("file_size").and_then(|v| v.as_u64()),
        Some(fs::metadata(&path).unwrap().len())
    );
    assert_eq!(
        result.metadata.get("encoding").and_then(|v| v.as_str()),
        Some("utf-8")
    );
}
