use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::reporter::Reporter;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::types::{create_shared, Shared};
use std::io::Write;

fn run_lox(source: &str, repl: bool) -> (String, Reporter) {
    let out = create_shared(Vec::new());
    let sink: Shared<dyn Write> = out.clone();
    let mut interpreter = Interpreter::with_output(sink);
    let mut reporter = Reporter::new();
    lox::run(source, &mut interpreter, &mut reporter, repl);
    let output = String::from_utf8(out.borrow().clone()).expect("program output is UTF-8");
    (output, reporter)
}

fn assert_output(source: &str, expected: &str) {
    let (output, reporter) = run_lox(source, false);
    assert!(!reporter.had_error, "compile error for: {}", source);
    assert!(!reporter.had_runtime_error, "runtime error for: {}", source);
    assert_eq!(output, expected, "for: {}", source);
}

fn assert_compile_error(source: &str) {
    let (_, reporter) = run_lox(source, false);
    assert!(reporter.had_error, "expected compile error for: {}", source);
}

fn assert_runtime_error(source: &str) {
    let (_, reporter) = run_lox(source, false);
    assert!(!reporter.had_error, "compile error for: {}", source);
    assert!(
        reporter.had_runtime_error,
        "expected runtime error for: {}",
        source
    );
}

/// Runs the pipeline by hand so the raw `RuntimeError` is observable
/// (`lox::run` consumes it into the reporter's stderr output).
fn runtime_error_message(source: &str) -> String {
    let out: Shared<dyn Write> = create_shared(Vec::<u8>::new());
    let mut interpreter = Interpreter::with_output(out);
    let mut reporter = Reporter::new();
    let tokens = Scanner::new(source).scan_tokens(&mut reporter);
    let statements = Parser::new(tokens, &mut interpreter.id, &mut reporter).parse();
    Resolver::new(&mut interpreter, &mut reporter).resolve(&statements);
    assert!(!reporter.had_error, "compile error for: {}", source);
    interpreter
        .interpret(&statements, false)
        .expect_err("expected a runtime error")
        .to_string()
}

#[test]
fn arithmetic_precedence() {
    assert_output("print 1 + 2 * 3;", "7\n");
    assert_output("print (1 + 2) * 3;", "9\n");
    assert_output("print 10 - 4 / 2;", "8\n");
    assert_output("print -3 + 5;", "2\n");
    assert_output("print !true;", "false\n");
    assert_output("print !nil;", "true\n");
}

#[test]
fn number_stringification_strips_integral_fraction() {
    assert_output("print 1.0;", "1\n");
    assert_output("print 1.5;", "1.5\n");
    assert_output("print 100.00;", "100\n");
    assert_output("print 2.5 * 2;", "5\n");
}

#[test]
fn string_concatenation() {
    assert_output("print \"foo\" + \"bar\";", "foobar\n");
    assert_output("print \"\" + \"x\";", "x\n");
}

#[test]
fn block_scoping_and_shadowing() {
    assert_output("var a = 1; { var a = 2; print a; } print a;", "2\n1\n");
    assert_output(
        "var a = \"global\"; { var b = a; var a = \"local\"; print b; print a; } print a;",
        "global\nlocal\nglobal\n",
    );
}

#[test]
fn global_redeclaration_is_allowed() {
    assert_output("var a = 1; var a = 2; print a;", "2\n");
}

#[test]
fn if_else_and_truthiness() {
    assert_output("if (0) print \"zero is truthy\";", "zero is truthy\n");
    assert_output("if (\"\") print \"empty is truthy\";", "empty is truthy\n");
    assert_output("if (nil) print \"t\"; else print \"f\";", "f\n");
    assert_output("if (false) print \"t\"; else print \"f\";", "f\n");
}

#[test]
fn logical_operators_short_circuit() {
    assert_output("print \"hi\" or 2;", "hi\n");
    assert_output("print nil or \"yes\";", "yes\n");
    assert_output("print nil and missing();", "nil\n");
    assert_output("print 1 and 2;", "2\n");
}

#[test]
fn while_and_for_loops() {
    assert_output(
        "var i = 0; while (i < 3) { print i; i = i + 1; }",
        "0\n1\n2\n",
    );
    assert_output("for (var i = 0; i < 3; i = i + 1) print i;", "0\n1\n2\n");
    assert_output(
        "var i = 0; for (; i < 2;) { print i; i = i + 1; }",
        "0\n1\n",
    );
}

#[test]
fn functions_and_closures() {
    assert_output(
        "fun make(n) { fun inner() { return n; } return inner; } var f = make(42); print f();",
        "42\n",
    );
    assert_output(
        "fun counter() { var i = 0; fun inc() { i = i + 1; return i; } return inc; } \
         var c = counter(); print c(); print c();",
        "1\n2\n",
    );
    assert_output("fun noReturn() {} print noReturn();", "nil\n");
    assert_output("fun f() { return; } print f();", "nil\n");
}

#[test]
fn closures_capture_the_definition_scope() {
    // Both closures share the frame in effect at definition time, so a
    // later shadowing declaration is invisible to them.
    assert_output(
        "{ var a = \"first\"; fun show() { print a; } show(); var b = show; \
         { var a = \"second\"; b(); } }",
        "first\nfirst\n",
    );
}

#[test]
fn function_stringification() {
    assert_output("fun f() {} print f;", "<fn f>\n");
    assert_output("print clock;", "<fn clock>\n");
}

#[test]
fn classes_and_methods() {
    assert_output(
        "class Bacon { eat() { print \"Crunch crunch crunch!\"; } } Bacon().eat();",
        "Crunch crunch crunch!\n",
    );
    assert_output("class Foo {} print Foo;", "Foo\n");
    assert_output("class Foo {} print Foo();", "Foo instance\n");
}

#[test]
fn initializer_and_this() {
    assert_output(
        "class Cake { init(flavor) { this.flavor = flavor; } \
         taste() { print \"The \" + this.flavor + \" cake is delicious.\"; } } \
         var c = Cake(\"German chocolate\"); c.taste();",
        "The German chocolate cake is delicious.\n",
    );
    // A bare return in an initializer still yields the instance.
    assert_output(
        "class C { init() { this.x = 1; return; } } var c = C(); print c.x;",
        "1\n",
    );
}

#[test]
fn fields_shadow_methods() {
    assert_output(
        "class C { f() { return \"method\"; } } var c = C(); \
         c.f = \"field\"; print c.f;",
        "field\n",
    );
}

#[test]
fn bound_methods_remember_their_instance() {
    assert_output(
        "class Person { init(name) { this.name = name; } sayName() { print this.name; } } \
         var jane = Person(\"Jane\"); var m = jane.sayName; m();",
        "Jane\n",
    );
}

#[test]
fn equality_rules() {
    assert_output("print nil == nil;", "true\n");
    assert_output("print nil == false;", "false\n");
    assert_output("print 1 == 1;", "true\n");
    assert_output("print \"a\" == \"a\";", "true\n");
    assert_output("print 1 == \"1\";", "false\n");
    assert_output("print 1 != 2;", "true\n");
    // NaN is not equal to itself.
    assert_output("print (0 / 0) == (0 / 0);", "false\n");
}

#[test]
fn clock_builtin_returns_a_number() {
    assert_output("print clock() > 0;", "true\n");
}

#[test]
fn repl_mode_echoes_expression_values() {
    let (output, reporter) = run_lox("1 + 2;", true);
    assert!(!reporter.had_error && !reporter.had_runtime_error);
    assert_eq!(output, "=> 3\n");

    let (output, _) = run_lox("var a = 5; a * 2;", true);
    assert_eq!(output, "=> 10\n");
}

#[test]
fn runtime_error_messages() {
    let message = runtime_error_message("\"a\" - 1;");
    assert!(message.contains("Operands must be numbers."), "{}", message);
    assert!(message.contains("[line 1]"), "{}", message);

    let message = runtime_error_message("print -\"a\";");
    assert!(message.contains("Operand must be a number."), "{}", message);

    let message = runtime_error_message("print 1 + \"a\";");
    assert!(
        message.contains("Operands must be two numbers or two strings."),
        "{}",
        message
    );

    let message = runtime_error_message("print missing;");
    assert!(
        message.contains("Undefined variable 'missing'."),
        "{}",
        message
    );

    let message = runtime_error_message("\"not a function\"();");
    assert!(
        message.contains("Can only call functions and classes."),
        "{}",
        message
    );

    let message = runtime_error_message("fun f(a) {} f();");
    assert!(
        message.contains("Expected 1 arguments but got 0."),
        "{}",
        message
    );

    let message = runtime_error_message("class C {} C().missing;");
    assert!(
        message.contains("Undefined property 'missing'."),
        "{}",
        message
    );

    let message = runtime_error_message("print \"str\".field;");
    assert!(
        message.contains("Only instances have properties."),
        "{}",
        message
    );

    let message = runtime_error_message("123.field = 1;");
    assert!(message.contains("Only instances have fields."), "{}", message);
}

#[test]
fn runtime_errors_set_the_flag() {
    assert_runtime_error("\"a\" - 1;");
    assert_runtime_error("undefinedVariable;");
    assert_runtime_error("nil();");
}

#[test]
fn resolution_errors() {
    assert_compile_error("return 1;");
    assert_compile_error("{ var a = a; }");
    assert_compile_error("{ var a = 1; var a = 2; }");
    assert_compile_error("print this;");
    assert_compile_error("fun f() { print this; }");
    assert_compile_error("class C { init() { return 1; } }");
}

#[test]
fn return_without_value_in_initializer_is_allowed() {
    assert_output("class C { init() { return; } } C(); print \"ok\";", "ok\n");
}

#[test]
fn parse_errors() {
    assert_compile_error("print;");
    assert_compile_error("var;");
    assert_compile_error("(1 + 2;");
    assert_compile_error("1 + 2 = 3;");
    assert_compile_error("fun f(a, b,) {}");
}

#[test]
fn parser_recovers_at_statement_boundaries() {
    let mut reporter = Reporter::new();
    let tokens = Scanner::new("var a = 1; var = 2; var b = 3;").scan_tokens(&mut reporter);
    let mut id = 0;
    let statements = Parser::new(tokens, &mut id, &mut reporter).parse();
    assert!(reporter.had_error);
    // The bad declaration keeps its slot so positions are preserved.
    assert_eq!(statements.len(), 3);
    assert!(statements[0].is_some());
    assert!(statements[1].is_none());
    assert!(statements[2].is_some());
}

#[test]
fn parser_terminates_on_garbage() {
    let mut reporter = Reporter::new();
    let tokens = Scanner::new(")))] = = fun fun {{{").scan_tokens(&mut reporter);
    let mut id = 0;
    let statements = Parser::new(tokens, &mut id, &mut reporter).parse();
    assert!(reporter.had_error);
    assert!(statements.iter().any(|s| s.is_none()));
}

#[test]
fn too_many_arguments_reports_but_keeps_parsing() {
    let mut reporter = Reporter::new();
    let tokens =
        Scanner::new("f(1, 2, 3, 4, 5, 6, 7, 8, 9); print 1;").scan_tokens(&mut reporter);
    let mut id = 0;
    let statements = Parser::new(tokens, &mut id, &mut reporter).parse();
    assert!(reporter.had_error);
    // Both statements parsed despite the report.
    assert_eq!(statements.iter().flatten().count(), 2);
}

#[test]
fn interpreter_survives_a_runtime_error() {
    // REPL-style reuse: a runtime error aborts one chunk but leaves the
    // interpreter and its globals usable for the next.
    let out = create_shared(Vec::new());
    let sink: Shared<dyn Write> = out.clone();
    let mut interpreter = Interpreter::with_output(sink);
    let mut reporter = Reporter::new();
    lox::run("var a = 1;", &mut interpreter, &mut reporter, false);
    lox::run(
        "{ var b = 2; \"x\" - 1; }",
        &mut interpreter,
        &mut reporter,
        false,
    );
    assert!(reporter.had_runtime_error);
    lox::run("print a;", &mut interpreter, &mut reporter, false);
    let output = String::from_utf8(out.borrow().clone()).unwrap();
    assert_eq!(output, "1\n");
}
