use sttfs::ast::{AttributeValue, Comparison, FileType, Node, Permission};
use sttfs::error::Error;
use sttfs::lexer::tokenize;
use sttfs::parser::{parse, parse_source};

fn parse_err(source: &str) -> (String, usize, usize) {
    match parse_source(source) {
        Err(Error::ParseError {
            message,
            line,
            column,
        }) => (message, line, column),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_empty_token_stream() {
    assert!(parse(&[]).unwrap().is_empty());
    assert!(parse(&tokenize("").unwrap()).unwrap().is_empty());
    assert!(parse_source("# only a comment").unwrap().is_empty());
}

#[test]
fn test_folder_with_children() {
    let nodes = parse_source(
        r#"
        folder "app" (hidden=true, permissions="700") {
            file "readme.txt"
            folder src { file "main.rs" (content="fn main() {}") }
        }
        "#,
    )
    .unwrap();

    assert_eq!(nodes.len(), 1);
    let Node::Folder(folder) = &nodes[0] else {
        panic!("Expected folder");
    };
    assert_eq!(folder.name, "app");
    assert_eq!(folder.attributes["hidden"], AttributeValue::Boolean(true));
    assert_eq!(
        folder.attributes["permissions"],
        AttributeValue::String("700".to_string())
    );
    assert_eq!(folder.children.len(), 2);
    let Node::File(readme) = &folder.children[0] else {
        panic!("Expected file");
    };
    assert_eq!(readme.name, "readme.txt");
    assert!(readme.attributes.is_empty());
    assert!(matches!(&folder.children[1], Node::Folder(src) if src.name == "src" && src.children.len() == 1));
}

#[test]
fn test_file_attributes_are_coerced() {
    let nodes = parse_source(
        r#"file "data.bin" (type="BINARY", permissions="755", size=12, note="plain", empty=null, replaceifexists=FALSE)"#,
    )
    .unwrap();
    let Node::File(file) = &nodes[0] else {
        panic!("Expected file");
    };
    assert_eq!(file.attributes["type"], AttributeValue::FileType(FileType::Binary));
    assert_eq!(
        file.attributes["permissions"],
        AttributeValue::Permission(Permission::Executable)
    );
    assert_eq!(file.attributes["size"], AttributeValue::Integer(12));
    assert_eq!(file.attributes["note"], AttributeValue::String("plain".to_string()));
    assert_eq!(file.attributes["empty"], AttributeValue::Null);
    assert_eq!(file.attributes["replaceifexists"], AttributeValue::Boolean(false));
}

#[test]
fn test_attribute_commas_are_optional() {
    let nodes = parse_source(r#"file a (hidden=true executable=true)"#).unwrap();
    let Node::File(file) = &nodes[0] else {
        panic!("Expected file");
    };
    assert_eq!(file.attributes.len(), 2);
}

#[test]
fn test_for_loop() {
    let nodes = parse_source(r#"for [n = 1; n <= 3; n++] { file "f_${n}.txt" }"#).unwrap();
    let Node::ForLoop(for_loop) = &nodes[0] else {
        panic!("Expected for loop");
    };
    assert_eq!(for_loop.var_name, "n");
    assert_eq!(for_loop.start, 1);
    assert_eq!(for_loop.end, 3);
    assert_eq!(for_loop.condition, Comparison::Le);
    assert_eq!(for_loop.step, 1);
    assert_eq!(for_loop.children.len(), 1);
    assert_eq!(for_loop.values().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_for_loop_counting_down_with_negative_bound() {
    let nodes = parse_source("for [i=2; i>-2; i--] { }").unwrap();
    let Node::ForLoop(for_loop) = &nodes[0] else {
        panic!("Expected for loop");
    };
    assert_eq!(for_loop.end, -2);
    assert_eq!(for_loop.step, -1);
    assert_eq!(for_loop.values().collect::<Vec<_>>(), vec![2, 1, 0, -1]);
}

#[test]
fn test_console_statements() {
    let nodes = parse_source(
        r#"
        stdout << "Project name? "
        stdin >> project
        folder "${project}" { }
        "#,
    )
    .unwrap();
    assert_eq!(nodes.len(), 3);
    assert!(matches!(&nodes[0], Node::Output(o) if o.message == "Project name? "));
    assert!(matches!(&nodes[1], Node::Input(i) if i.variable == "project"));
    assert!(matches!(&nodes[2], Node::Folder(f) if f.name == "${project}"));
}

#[test]
fn test_placeholder_token_as_name() {
    let nodes = parse_source("folder ${name} { }").unwrap();
    assert!(matches!(&nodes[0], Node::Folder(f) if f.name == "${name}"));
}

#[test]
fn test_mismatched_loop_variable() {
    let (message, line, column) = parse_err("for [i=0; j<3; i++] { }");
    assert!(message.contains("loop variable 'i'"));
    assert_eq!((line, column), (1, 11));

    let (message, _, _) = parse_err("for [i=0; i<3; k++] { }");
    assert!(message.contains("loop variable 'i'"));
}

#[test]
fn test_unsupported_comparison() {
    let (message, _, _) = parse_err("for [i=0; i==3; i++] { }");
    assert!(message.contains("unsupported comparison operator"));
}

#[test]
fn test_loop_step_must_be_increment_or_decrement() {
    let (message, _, _) = parse_err("for [i=0; i<3; i+1] { }");
    assert!(message.contains("'++' or '--'"));
}

#[test]
fn test_loop_bounds_must_be_integers() {
    let (message, _, _) = parse_err("for [i=0.5; i<3; i++] { }");
    assert!(message.contains("integer"));
}

#[test]
fn test_unsupported_attribute_value() {
    let (message, line, column) = parse_err("file a (size={)");
    assert!(message.contains("unsupported attribute value"));
    assert_eq!((line, column), (1, 14));
}

#[test]
fn test_unclosed_folder_body() {
    let (message, _, _) = parse_err("folder a { file b");
    assert!(message.contains("end of input"));
}

#[test]
fn test_stdout_requires_string() {
    let (message, _, _) = parse_err("stdout << name");
    assert!(message.contains("expected string"));
}

#[test]
fn test_unexpected_statement() {
    let (message, line, column) = parse_err("folder a { }\n}");
    assert!(message.contains("expected a statement"));
    assert_eq!((line, column), (2, 1));
}

#[test]
fn test_no_partial_tree_on_error() {
    assert!(parse_source("file ok\nfile").is_err());
}
