use gdfmt::format::{format_source, run_formatter, FormatOptions};
use pretty_assertions::assert_eq;

fn format(source: &str) -> String {
    format_source(source, &FormatOptions::default()).unwrap()
}

fn format_with(source: &str, options: &FormatOptions) -> String {
    format_source(source, options).unwrap()
}

fn format_with_spaces(source: &str, spaces: usize) -> String {
    format_source(source, &FormatOptions::with_spaces(spaces)).unwrap()
}

fn format_ok(source: &str) -> bool {
    format_source(source, &FormatOptions::default()).is_ok()
}

fn narrow(limit: usize) -> FormatOptions {
    FormatOptions {
        max_line_length: limit,
        ..FormatOptions::default()
    }
}

#[test]
fn test_extends_statement() {
    assert_eq!(format("extends  Node2D\n"), "extends Node2D\n");
    assert_eq!(format("extends   Node2D\n"), "extends Node2D\n");
}

#[test]
fn test_class_name_statement() {
    assert_eq!(format("class_name   MyClass\n"), "class_name MyClass\n");
}

#[test]
fn test_variable_statement() {
    assert_eq!(format("var x:int=1\n"), "var x: int = 1\n");
    assert_eq!(format("var   x  :  int   =   1\n"), "var x: int = 1\n");
    assert_eq!(format("var x = 1\n"), "var x = 1\n");
}

#[test]
fn test_inferred_type_variable() {
    assert_eq!(format("var x := 1\n"), "var x := 1\n");
    assert_eq!(format("var x:=1\n"), "var x := 1\n");
    assert_eq!(
        format("var gltf := GLTFDocument.new()\n"),
        "var gltf := GLTFDocument.new()\n"
    );
}

#[test]
fn test_const_statement() {
    assert_eq!(format("const X:int=1\n"), "const X: int = 1\n");
    assert_eq!(format("const   X   =   100\n"), "const X = 100\n");
}

#[test]
fn test_function_definition() {
    assert_eq!(format("func foo(  ):\n\tpass\n"), "func foo():\n\tpass\n");
    assert_eq!(
        format("func foo(a:int,b:int)->int:\n\treturn a+b\n"),
        "func foo(a: int, b: int) -> int:\n\treturn a + b\n"
    );
}

#[test]
fn test_function_call() {
    assert_eq!(format("print(   \"Hello\"   )\n"), "print(\"Hello\")\n");
    assert_eq!(format("foo(  a  ,  b  ,  c  )\n"), "foo(a, b, c)\n");
}

#[test]
fn test_binary_operators() {
    assert_eq!(format("var x = a+b\n"), "var x = a + b\n");
    assert_eq!(format("var x = a-b\n"), "var x = a - b\n");
    assert_eq!(format("var x = a*b\n"), "var x = a * b\n");
    assert_eq!(format("var x = a/b\n"), "var x = a / b\n");
}

#[test]
fn test_return_statement() {
    assert_eq!(format("func foo():\n\treturn\n"), "func foo():\n\treturn\n");
    assert_eq!(
        format("func foo():\n\treturn a+b\n"),
        "func foo():\n\treturn a + b\n"
    );
}

#[test]
fn test_pass_break_continue() {
    assert_eq!(format("func foo():\n\tpass\n"), "func foo():\n\tpass\n");
    assert_eq!(
        format("func foo():\n\twhile true:\n\t\tbreak\n"),
        "func foo():\n\twhile true:\n\t\tbreak\n"
    );
    assert_eq!(
        format("func foo():\n\twhile true:\n\t\tcontinue\n"),
        "func foo():\n\twhile true:\n\t\tcontinue\n"
    );
}

#[test]
fn test_fmt_off_on() {
    let source = "extends Node2D\n# fmt: off\nvar   x   =   1\n# fmt: on\nvar y = 2\n";
    let formatted = format(source);
    assert!(formatted.contains("var   x   =   1"));
    assert!(formatted.contains("var y = 2"));
}

#[test]
fn test_indent_with_spaces() {
    assert_eq!(
        format_with_spaces("func foo():\n\tpass\n", 4),
        "func foo():\n    pass\n"
    );
}

#[test]
fn test_indent_with_odd_space_count() {
    assert_eq!(
        format_with_spaces("func foo():\n\tpass\n", 7),
        "func foo():\n       pass\n"
    );
}

#[test]
fn test_trailing_newline() {
    assert_eq!(format("var x = 1"), "var x = 1\n");
    assert_eq!(format("var x = 1\n"), "var x = 1\n");
    assert_eq!(format("var x = 1\n\n"), "var x = 1\n");
}

#[test]
fn test_array_literal() {
    assert_eq!(format("var x = [1,2,3]\n"), "var x = [1, 2, 3]\n");
    assert_eq!(format("var x = [  1 ,  2 ,  3 ]\n"), "var x = [1, 2, 3]\n");
    assert_eq!(format("var x = []\n"), "var x = []\n");
}

#[test]
fn test_dictionary_literal() {
    assert_eq!(format("var x = {a:1,b:2}\n"), "var x = { a: 1, b: 2 }\n");
    assert_eq!(format("var x = {}\n"), "var x = {}\n");
}

#[test]
fn test_if_statement() {
    let formatted = format("if x==1:\n\tpass\n");
    assert!(formatted.contains("if x == 1:"));
}

#[test]
fn test_for_statement() {
    let formatted = format("for i in range(10):\n\tpass\n");
    assert!(formatted.contains("for i in range(10):"));
}

#[test]
fn test_while_statement() {
    let formatted = format("while x>0:\n\tpass\n");
    assert!(formatted.contains("while x > 0:"));
}

#[test]
fn test_signal_statement() {
    assert_eq!(format("signal my_signal\n"), "signal my_signal\n");
    assert_eq!(
        format("signal damaged(amount:int)\n"),
        "signal damaged(amount: int)\n"
    );
}

#[test]
fn test_enum_definition() {
    assert_eq!(
        format("enum State { IDLE, WALKING, RUNNING }\n"),
        "enum State { IDLE, WALKING, RUNNING }\n"
    );
}

#[test]
fn test_enum_trailing_comma_goes_multiline() {
    assert_eq!(
        format("enum State { IDLE, WALKING, }\n"),
        "enum State {\n\tIDLE,\n\tWALKING,\n}\n"
    );
}

#[test]
fn test_function_default_parameters() {
    let input = "func save_file(path: String, with_model: bool = false, count: int = 10):\n\tpass\n";
    assert_eq!(format(input), input);
}

#[test]
fn test_await_expression() {
    assert_eq!(
        format("func f():\n\tawait   get_tree().process_frame\n"),
        "func f():\n\tawait get_tree().process_frame\n"
    );
}

#[test]
fn test_method_chaining() {
    assert_eq!(
        format("var x = obj.method().another()\n"),
        "var x = obj.method().another()\n"
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(format("if x!=OK:\n\tpass\n"), "if x != OK:\n\tpass\n");
    assert_eq!(format("if x==1:\n\tpass\n"), "if x == 1:\n\tpass\n");
}

#[test]
fn test_boolean_operators_are_canonicalized() {
    assert_eq!(format("if x && y:\n\tpass\n"), "if x and y:\n\tpass\n");
    assert_eq!(format("if x || y:\n\tpass\n"), "if x or y:\n\tpass\n");
    assert_eq!(format("if !x:\n\tpass\n"), "if not x:\n\tpass\n");
}

#[test]
fn test_elif_body() {
    let input = "if x == 1:\n\tx = 2\nelif x == 3:\n\tx = 4\n";
    assert_eq!(format(input), input);
}

#[test]
fn test_complex_elif_chain() {
    let input = r#"if name == "main":
	resource = "ModelMesh"
elif not name.begins_with("ModelMesh_"):
	resource = "ModelMesh_" + str(name)
else:
	resource = name
"#;
    assert_eq!(format(input), input);
}

#[test]
fn test_multiline_dictionary() {
    let input = r#"var data := {
	"key1": "value1",
	"key2": "value2",
}
"#;
    assert_eq!(format(input), input);
}

#[test]
fn test_match_statement() {
    let input = "match state:\n\t1:\n\t\tpass\n\t_:\n\t\tpass\n";
    assert_eq!(format(input), input);
}

// Blank-line policy

#[test]
fn test_top_level_functions_get_two_blank_lines() {
    assert_eq!(
        format("func a():\n\tpass\nfunc b():\n\tpass\n"),
        "func a():\n\tpass\n\n\nfunc b():\n\tpass\n"
    );
}

#[test]
fn test_excess_blank_lines_collapse_to_two() {
    assert_eq!(
        format("func a():\n\tpass\n\n\n\n\n\nfunc b():\n\tpass\n"),
        "func a():\n\tpass\n\n\nfunc b():\n\tpass\n"
    );
}

#[test]
fn test_var_before_function_gets_two_blank_lines() {
    assert_eq!(
        format("var x = 1\nfunc a():\n\tpass\n"),
        "var x = 1\n\n\nfunc a():\n\tpass\n"
    );
}

#[test]
fn test_adjacent_vars_get_no_blank_lines() {
    assert_eq!(
        format("var x = 1\n\n\n\nvar y = 2\n"),
        "var x = 1\nvar y = 2\n"
    );
}

#[test]
fn test_nested_functions_get_one_blank_line() {
    assert_eq!(
        format("class Inner:\n\tfunc a():\n\t\tpass\n\tfunc b():\n\t\tpass\n"),
        "class Inner:\n\tfunc a():\n\t\tpass\n\n\tfunc b():\n\t\tpass\n"
    );
}

#[test]
fn test_single_blank_lines_option() {
    let options = FormatOptions {
        single_blank_lines: true,
        ..FormatOptions::default()
    };
    assert_eq!(
        format_with("func a():\n\tpass\nfunc b():\n\tpass\n", &options),
        "func a():\n\tpass\n\nfunc b():\n\tpass\n"
    );
}

#[test]
fn test_global_blank_line_override() {
    let mut options = FormatOptions::default();
    options.global_blank_lines.insert("func".to_string(), 1);
    assert_eq!(
        format_with("func a():\n\tpass\nfunc b():\n\tpass\n", &options),
        "func a():\n\tpass\n\nfunc b():\n\tpass\n"
    );
}

#[test]
fn test_global_blank_line_override_above_two() {
    let mut options = FormatOptions::default();
    options.global_blank_lines.insert("func".to_string(), 3);
    assert_eq!(
        format_with("func a():\n\tpass\nfunc b():\n\tpass\n", &options),
        "func a():\n\tpass\n\n\n\nfunc b():\n\tpass\n"
    );
}

#[test]
fn test_no_blank_lines_at_file_start() {
    assert_eq!(format("\n\n\nvar x = 1\n"), "var x = 1\n");
}

// Comments

#[test]
fn test_standalone_comment_preserved() {
    assert_eq!(
        format("# header\nvar x = 1\n"),
        "# header\nvar x = 1\n"
    );
}

#[test]
fn test_comment_before_function_stays_attached() {
    assert_eq!(
        format("var x = 1\n# helper\nfunc foo():\n\tpass\n"),
        "var x = 1\n\n\n# helper\nfunc foo():\n\tpass\n"
    );
}

#[test]
fn test_inline_comment_preserved() {
    assert_eq!(format("var x = 1  # note\n"), "var x = 1  # note\n");
    assert_eq!(format("var x = 1 # note\n"), "var x = 1  # note\n");
}

#[test]
fn test_body_comment_reindented() {
    assert_eq!(
        format("func foo():\n\t\t# note\n\tpass\n"),
        "func foo():\n\t# note\n\tpass\n"
    );
}

#[test]
fn test_trailing_comment_kept() {
    assert_eq!(
        format("var x = 1\n# trailing\n"),
        "var x = 1\n# trailing\n"
    );
}

#[test]
fn test_standalone_comment_inside_multiline_call_is_preserved() {
    let source = "foo(\n\taaaa,\n\t# keep me\n\tbbbb,\n)\n";
    assert_eq!(format(source), source);
}

#[test]
fn test_inline_comment_inside_multiline_call_is_preserved() {
    let source = "foo(\n\taaaa,  # note\n\tbbbb,\n)\n";
    assert_eq!(format(source), source);
}

#[test]
fn test_comment_inside_multiline_array_is_preserved() {
    let source = "var x = [\n\t1,\n\t# two\n\t2,\n]\n";
    assert_eq!(format(source), source);
}

#[test]
fn test_comment_gap_capped_at_one_blank() {
    assert_eq!(
        format("var x = 1\n\n\n\n# later\n"),
        "var x = 1\n\n# later\n"
    );
}

// Line wrapping

#[test]
fn test_long_call_splits_one_argument_per_line() {
    let options = narrow(30);
    assert_eq!(
        format_with("foo(aaaaaaaaaa, bbbbbbbbbb, cccccccccc)\n", &options),
        "foo(\n\taaaaaaaaaa,\n\tbbbbbbbbbb,\n\tcccccccccc,\n)\n"
    );
}

#[test]
fn test_trailing_comma_forces_multiline_array() {
    assert_eq!(
        format("var x = [1, 2,]\n"),
        "var x = [\n\t1,\n\t2,\n]\n"
    );
}

#[test]
fn test_long_operator_chain_wraps_in_parentheses() {
    let options = narrow(20);
    assert_eq!(
        format_with("var x = aaaa and bbbb and cccc and dddd\n", &options),
        "var x = (\n\taaaa\n\tand bbbb\n\tand cccc\n\tand dddd\n)\n"
    );
}

#[test]
fn test_wrapped_output_is_idempotent() {
    let options = narrow(30);
    let once = format_with("foo(aaaaaaaaaa, bbbbbbbbbb, cccccccccc)\n", &options);
    let twice = format_with(&once, &options);
    assert_eq!(once, twice);
}

#[test]
fn test_unsplittable_line_is_reported() {
    let source = format!("var {} = 1\n", "x".repeat(120));
    let outcome = run_formatter(&source, &FormatOptions::default()).unwrap();
    assert_eq!(outcome.overlong_lines, vec![1]);
    // The line itself is left intact.
    assert!(outcome.text.contains(&"x".repeat(120)));
}

#[test]
fn test_short_lines_report_nothing() {
    let outcome = run_formatter("var x = 1\n", &FormatOptions::default()).unwrap();
    assert!(outcome.overlong_lines.is_empty());
}

// Annotations

#[test]
fn test_inline_annotation_stays_on_declaration() {
    assert!(format_ok("@export var health: int = 100\n"));
    let formatted = format("@export var health: int = 100\n");
    assert!(formatted.contains("@export"));
    assert!(formatted.contains("var health: int = 100"));
}

#[test]
fn test_parse_error_is_reported() {
    assert!(format_source("func (((\n", &FormatOptions::default()).is_err());
}

#[test]
fn test_empty_file() {
    assert_eq!(format(""), "");
}

#[test]
fn test_statement_separator_splits_lines() {
    assert_eq!(format("pass;pass\n"), "pass\npass\n");
}
