// Integration tests for the Minipar interpreter
//
// These tests run complete Minipar programs through the whole pipeline and
// check the captured output or the reported error. Tests cover:
// - Arithmetic, comparisons and string operations
// - Arrays, indexing and pass-by-reference arguments
// - Control flow (if/else, while, for, break, continue)
// - Functions, defaults and recursion
// - par blocks and s_channel servers
// - Syntax, semantic and runtime errors

use minipar::errors::MiniparError;
use minipar::interpreter::InterpreterConfig;
use minipar::{run_pipeline, run_source};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn execute(code: &str, check: bool) -> (Result<(), MiniparError>, String) {
    let output = Arc::new(Mutex::new(Vec::new()));
    let config = InterpreterConfig::new().with_output(output.clone());
    let result = run_pipeline(code, config, check);
    let text = String::from_utf8(output.lock().expect("output lock").clone()).expect("utf8 output");
    (result, text)
}

fn run_code(code: &str) -> String {
    let (result, output) = execute(code, true);
    if let Err(e) = result {
        panic!("program failed: {}\noutput so far:\n{}", e, output);
    }
    output
}

fn run_err(code: &str) -> MiniparError {
    match execute(code, true) {
        (Err(e), _) => e,
        (Ok(()), output) => panic!("program should fail, printed:\n{}", output),
    }
}

fn run_unchecked_err(code: &str) -> MiniparError {
    match execute(code, false) {
        (Err(e), _) => e,
        (Ok(()), output) => panic!("program should fail, printed:\n{}", output),
    }
}

fn available_tcp_port() -> u16 {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("ephemeral tcp listener should bind");
    listener.local_addr().expect("ephemeral tcp listener should have local addr").port()
}

#[test]
fn test_arithmetic_follows_ieee() {
    let output = run_code("print(1 + 2 * 3, 7 / 2, 0.1 + 0.2, 10 - 4 - 3)");
    assert_eq!(output, "7\n3.5\n0.30000000000000004\n3\n");
}

#[test]
fn test_division_by_zero_is_fatal() {
    let err = run_err("x: num = 1 / 0");
    assert!(matches!(err, MiniparError::Runtime(ref e) if e.message.contains("division by zero")));
}

#[test]
fn test_array_literal_and_indexing() {
    let code = r#"
        xs = [1, 2, 3]
        print(xs, len(xs), xs[2])
        s: string = "abc"
        print(s[1])
    "#;
    assert_eq!(run_code(code), "[1, 2, 3]\n3\n3\nb\n");
}

#[test]
fn test_index_out_of_range_is_fatal() {
    let err = run_err("xs: array[3] = [1, 2, 3]\nprint(xs[3])");
    assert!(matches!(err, MiniparError::Runtime(ref e) if e.message.contains("out of range")));

    let err = run_err("s: string = \"ab\"\nprint(s[5])");
    assert!(matches!(err, MiniparError::Runtime(_)));
}

#[test]
fn test_multidimensional_arrays() {
    let code = r#"
        m: array[2][2]
        m[1][0] = 5
        m[0][1]++
        print(m)
    "#;
    assert_eq!(run_code(code), "[[0, 1], [5, 0]]\n");
}

#[test]
fn test_for_loop_prints_each_iteration() {
    assert_eq!(run_code("for (i: num = 0; i < 3; i++) { print(i) }"), "0\n1\n2\n");
}

#[test]
fn test_break_and_continue_inside_while() {
    let code = r#"
        i: num = 0
        while (i < 10) {
            i++
            if (i == 2) { continue }
            if (i == 5) { break }
            print(i)
        }
        print("done")
    "#;
    assert_eq!(run_code(code), "1\n3\n4\ndone\n");
}

#[test]
fn test_break_outside_loop_is_semantic_error() {
    assert!(matches!(run_err("break"), MiniparError::Semantic(_)));
    assert!(matches!(run_err("if (true) { continue }"), MiniparError::Semantic(_)));
}

#[test]
fn test_function_call_and_arity() {
    let code = "func add(a: num, b: num) -> num { return a + b }\nprint(add(2, 3))";
    assert_eq!(run_code(code), "5\n");

    let one_arg = "func add(a: num, b: num) -> num { return a + b }\nprint(add(2))";
    assert!(matches!(run_unchecked_err(one_arg), MiniparError::Runtime(_)));
    assert!(matches!(run_err(one_arg), MiniparError::Semantic(_)));
}

#[test]
fn test_return_type_mismatch_is_semantic_error() {
    let err = run_err("func name() -> string { return 1 }");
    assert!(matches!(err, MiniparError::Semantic(_)));
}

#[test]
fn test_default_parameters() {
    let code = r#"
        func greet(name: string, punct: string = "!") -> string {
            return "hi " + name + punct
        }
        print(greet("bob"), greet("ann", "?"))
    "#;
    assert_eq!(run_code(code), "hi bob!\nhi ann?\n");
}

#[test]
fn test_recursion() {
    let code = r#"
        func fact(n: num) -> num {
            if (n <= 1) { return 1 }
            return n * fact(n - 1)
        }
        print(fact(5))
    "#;
    assert_eq!(run_code(code), "120\n");
}

#[test]
fn test_arrays_pass_by_reference_scalars_by_value() {
    let code = r#"
        func fill(xs: array) -> void { xs[0] = 99 }
        func bump(n: num) -> num {
            n = n + 1
            return n
        }
        data: array[2] = [1, 2]
        fill(data)
        x: num = 1
        print(data, bump(x), x)
    "#;
    assert_eq!(run_code(code), "[99, 2]\n2\n1\n");
}

#[test]
fn test_par_side_effects_visible_after_block() {
    let code = r#"
        results: array[3]
        a: num = 0
        b: num = 0
        func mark(slot: num) -> void { results[slot] = slot + 10 }
        func set_a() -> void { a = 1 }
        func set_b() -> void { b = 2 }
        par {
            mark(0)
            mark(1)
            mark(2)
            set_a()
            set_b()
        }
        print(results, a + b)
    "#;
    assert_eq!(run_code(code), "[10, 11, 12]\n3\n");
}

#[test]
fn test_par_reports_child_error() {
    let code = r#"
        func fail() -> num { return 1 / 0 }
        func fine() -> void { }
        par {
            fine()
            fail()
        }
    "#;
    assert!(matches!(run_err(code), MiniparError::Runtime(_)));
}

#[test]
fn test_scoping_of_declarations_and_assignments() {
    let code = r#"
        x: num = 1
        y: num = 1
        seq {
            x: num = 2
            y = 5
            print(x)
        }
        print(x, y)
    "#;
    assert_eq!(run_code(code), "2\n1\n5\n");
}

#[test]
fn test_short_circuit_logic() {
    let code = r#"
        func loud() -> bool {
            print("evaluated")
            return true
        }
        if (false && loud()) { print("no") }
        if (true || loud()) { print("yes") }
    "#;
    assert_eq!(run_code(code), "yes\n");
}

#[test]
fn test_else_if_chain_and_strings() {
    let code = r#"
        func classify(n: num) -> string {
            if (n < 0) { return "negative" } else if (n == 0) { return "zero" } else { return "positive" }
        }
        print(classify(-3), classify(0), classify(8))
        print("tab\there", to_string(2.5) + "!", isnum("42"), isalpha("4a"))
    "#;
    assert_eq!(run_code(code), "negative\nzero\npositive\ntab\there\n2.5!\ntrue\nfalse\n");
}

#[test]
fn test_typed_num_declaration_converts_text() {
    assert_eq!(run_code("n: num = \"41\"\nprint(n + 1)"), "42\n");
    assert!(matches!(run_err("n: num = \"many\""), MiniparError::Runtime(_)));
}

#[test]
fn test_reassigning_text_to_num_variable_converts() {
    let code = r#"
        n: num = 0
        n = "5"
        print(n + 1)
        func bump(x: num) -> num {
            x = "10"
            return x * 2
        }
        print(bump(1))
    "#;
    assert_eq!(run_code(code), "6\n20\n");
    assert!(matches!(run_err("n: num = 1\nn = \"lots\""), MiniparError::Runtime(_)));
}

#[test]
fn test_nested_reads_over_a_large_matrix() {
    let code = r#"
        m: array[120][120]
        for (i: num = 0; i < 120; i++) {
            for (j: num = 0; j < 120; j++) {
                m[i][j] = i + j
            }
        }
        total: num = 0
        for (i: num = 0; i < 120; i++) {
            for (j: num = 0; j < 120; j++) {
                total = total + m[i][j]
            }
        }
        print(total, m[119][119], m[3][0])
    "#;
    assert_eq!(run_code(code), "1713600\n238\n3\n");
}

#[test]
fn test_syntax_error_reports_line() {
    match run_err("x: num = 1\nif (x > 0 {\n print(x) }") {
        MiniparError::Syntax(e) => assert_eq!(e.line, 2),
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_unknown_function_suggestion() {
    match run_err("prnt(\"hi\")") {
        MiniparError::Semantic(e) => assert_eq!(e.suggestion.as_deref(), Some("print")),
        other => panic!("expected semantic error, got {:?}", other),
    }
    assert!(matches!(run_unchecked_err("prnt(\"hi\")"), MiniparError::Runtime(_)));
}

#[test]
fn test_echo_server_channel() {
    let port = available_tcp_port();
    let code = format!(
        "func echo(msg: string) -> string {{ return msg }}\n\
         s_channel server {{ echo, \"echo service\", \"127.0.0.1\", {} }}",
        port
    );
    let server = std::thread::spawn(move || {
        run_source(&code, InterpreterConfig::new().with_max_connections(1))
    });

    let mut stream = None;
    for _ in 0..100 {
        match TcpStream::connect(("127.0.0.1", port)) {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(_) => std::thread::sleep(Duration::from_millis(20)),
        }
    }
    let mut stream = stream.expect("server channel should accept connections");
    stream.write_all(b"ping over tcp").expect("request should be sent");
    let mut reply = String::new();
    stream.read_to_string(&mut reply).expect("reply should be readable");
    assert_eq!(reply, "ping over tcp");

    let result = server.join().expect("server thread should finish");
    assert!(result.is_ok(), "{:?}", result);
}

#[test]
fn test_client_channel_declaration_runs() {
    assert_eq!(run_code("c_channel client { \"localhost\", 8000 }\nprint(\"ready\")"), "ready\n");
    let err = run_err("c_channel client { 8000, \"localhost\" }");
    assert!(matches!(err, MiniparError::Semantic(_)));
}
