//! Integration tests for the parse-then-report pipeline

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use rocker_inspect::report::UnitDescriber;
use rocker_inspect::{
    inspect_file, inspect_str, InspectConfig, InspectError, ParseError, RenderError, Renderer,
    TemplateParser, TemplateUnit, UnitKind,
};

const INDEX: &str = "@import com.example.Item\n\
@args (String title, java.util.List<Item> items)\n\
<h1>@title</h1>\n\
@for (item : items) {\n\
@if (item.isActive()) {\n\
<li>@item.getName()</li>\n\
} else {\n\
@continue\n\
}\n\
}\n";

#[test]
fn test_full_report() {
    let report = inspect_str(INDEX, "views/index.rocker.html").expect("Should inspect");
    insta::assert_snapshot!(report, @r###"
--- template model ---
template: index.rocker.html
name: index
package: views
content type: HTML

import: com.example.Item
 src (@ [1,1]): [@import com.example.Item]
arg: String title
 src (@ [2,8]): [String title]
arg: java.util.List<Item> items
 src (@ [2,22]): [java.util.List<Item> items]
plain: \n<h1>
 src (@ [2,49]): [\n<h1>]
value: title
 src (@ [3,5]): [@title]
plain: </h1>\n
 src (@ [3,11]): [</h1>\n]
for begin: item : items
 src (@ [4,1]): [@for (item : items) {]
plain: \n
 src (@ [4,22]): [\n]
if begin: item.isActive()
 src (@ [5,1]): [@if (item.isActive()) {]
plain: \n<li>
 src (@ [5,24]): [\n<li>]
value: item.getName()
 src (@ [6,5]): [@item.getName()]
plain: </li>\n
 src (@ [6,20]): [</li>\n]
else begin
 src (@ [7,1]): [} else {]
plain: \n
 src (@ [7,9]): [\n]
continue
 src (@ [8,1]): [@continue]
plain: \n
 src (@ [8,10]): [\n]
if end
 src (@ [9,1]): [}]
plain: \n
 src (@ [9,2]): [\n]
for end
 src (@ [10,1]): [}]
plain: \n
 src (@ [10,2]): [\n]
"###);
}

#[test]
fn test_report_is_deterministic() {
    let first = inspect_str(INDEX, "views/index.rocker.html").unwrap();
    let second = inspect_str(INDEX, "views/index.rocker.html").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parse_file_from_template_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("views")).unwrap();
    fs::write(dir.path().join("views/index.rocker.html"), INDEX).unwrap();

    let config = InspectConfig::new().with_template_directory(dir.path());
    let model = TemplateParser::new(config)
        .parse_file(Path::new("views/index.rocker.html"))
        .expect("Should parse");

    assert_eq!(model.template_name(), "index.rocker.html");
    assert_eq!(model.name(), "index");
    assert_eq!(model.package_name(), "views");
    assert_eq!(model.imports().len(), 1);
    assert_eq!(model.arguments().len(), 2);
    assert_eq!(model.units().first().map(|u| u.kind()), Some(UnitKind::PlainText));
}

#[test]
fn test_parse_file_absolute_path_below_template_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("com/example");
    fs::create_dir_all(&nested).unwrap();
    let file = nested.join("mail.rocker.raw");
    fs::write(&file, "Dear @name,\n").unwrap();

    let config = InspectConfig::new().with_template_directory(dir.path());
    let model = TemplateParser::new(config).parse_file(&file).unwrap();
    assert_eq!(model.package_name(), "com.example");
    assert_eq!(model.content_type().to_string(), "RAW");
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = InspectConfig::new().with_template_directory(dir.path());

    let err = inspect_file("views/missing.rocker.html", &config).unwrap_err();
    match err {
        InspectError::Parse(ParseError::SourceUnavailable { source_id, cause }) => {
            assert_eq!(source_id, "views/missing.rocker.html");
            assert_eq!(cause.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected SourceUnavailable, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_location() {
    let source = "line one\nline two\nline three\n123456789@";
    let err = TemplateParser::default().parse_str(source, "tpl.txt").unwrap_err();

    assert_eq!(err.location(), Some((4, 10)));
    let message = err.to_string();
    assert_eq!(
        message,
        "tpl.txt:[4,10] Expected an expression or directive after '@'"
    );

    let formatted = err.format(source);
    assert!(formatted.contains("tpl.txt"));
    assert!(formatted.contains("Expected an expression or directive after '@'"));
}

#[test]
fn test_syntax_error_in_args_maps_to_template() {
    let source = "@import a.B\n@args (String `title)\n<p>";
    let err = TemplateParser::default().parse_str(source, "tpl.txt").unwrap_err();
    assert_eq!(err.location(), Some((2, 15)));
    assert_eq!(err.to_string(), "tpl.txt:[2,15] Unexpected character '`'");
}

#[test]
fn test_syntax_error_renders_nothing() {
    let err = inspect_str("<p>@for (x : xs) {</p>", "tpl.txt").unwrap_err();
    assert!(matches!(err, InspectError::Parse(ParseError::Syntax { .. })));
}

#[test]
fn test_with_and_else_if_report() {
    let source = "@with? (String n = user.name) {@n}@if (a) {A} else if (b) {B}";
    let report = inspect_str(source, "w.rocker.html").unwrap();
    assert!(report.contains(
        "with begin: isNullSafe=true (String n = user.name)\n\
         \x20src (@ [1,1]): [@with? (String n = user.name) {]\n"
    ));
    assert!(report.contains("with end\n src (@ [1,34]): [}]\n"));
    assert!(report.contains("else if begin: b\n src (@ [1,45]): [} else if (b) {]\n"));
    assert!(report.ends_with("if end\n src (@ [1,61]): [}]\n"));
}

#[test]
fn test_multi_line_argument_type_stays_on_one_line() {
    let source = "@args (java.util.Map<String,\n    Integer> counts)\nx";
    let report = inspect_str(source, "m.rocker.html").unwrap();
    assert!(report.contains(
        "arg: java.util.Map<String,\\n    Integer> counts\n\
         \x20src (@ [1,8]): [java.util.Map<String,\\n    Integer> counts]\n"
    ));
    assert!(!report.lines().any(|l| l.trim_start().starts_with("Integer>")));
}

#[test]
fn test_import_with_tab_is_escaped() {
    let report = inspect_str("@import java.util.\tList\nx", "i.rocker.html").unwrap();
    assert!(report.contains(
        "import: java.util.\\tList\n src (@ [1,1]): [@import java.util.\\tList]\n"
    ));
    assert!(!report.contains('\t'));
}

#[test]
fn test_null_ternary_report() {
    let report = inspect_str("@(user.nickname ?: \"anon\")", "n.rocker.html").unwrap();
    assert!(report.contains("nullTernary: user.nickname ?: \"anon\"\n"));
}

/// Has no case for break statements
struct NoBreaks;

impl UnitDescriber for NoBreaks {
    fn describe(&self, unit: &TemplateUnit) -> Option<String> {
        match unit {
            TemplateUnit::BreakStatement(_) => None,
            other => Some(other.kind().to_string()),
        }
    }
}

#[test]
fn test_custom_describer_dispatch_miss() {
    let model = TemplateParser::default()
        .parse_str("@for (x : xs) {\n  @break\n}", "loop.rocker.html")
        .unwrap();
    let renderer = Renderer::with_describer(NoBreaks, 80);

    let mut lines: Vec<String> = Vec::new();
    let err = renderer.render(&model, &mut lines).unwrap_err();
    assert!(lines.is_empty());
    match err {
        RenderError::TaxonomyDispatchMiss {
            kind,
            index,
            source_ref,
        } => {
            assert_eq!(kind, UnitKind::BreakStatement);
            assert_eq!(index, 2);
            assert_eq!(source_ref.to_string(), "[2,3]");
        }
    }
}
