//! End-to-end scenarios run through `brewin::run_source`, one per
//! behavior the language spec calls out as worth pinning down with a test.

use brewin::{BrewinError, CollectedIo, EvalError, run_source};
use pretty_assertions::assert_eq;

fn run(source: &str) -> Result<Vec<String>, BrewinError> {
    let mut host = CollectedIo::new([]);
    run_source(source, &mut host)?;
    Ok(host.into_output())
}

#[test]
fn recursive_factorial() {
    let output = run(
        r#"
        func fact(n) {
            if (n <= 1) {
                return 1;
            }
            return n * fact(n - 1);
        }
        func main() {
            print(fact(6));
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["720"]);
}

#[test]
fn refarg_swap_mutates_caller_variables() {
    let output = run(
        r#"
        func swap(refarg a, refarg b) {
            t = a;
            a = b;
            b = t;
        }
        func main() {
            x = 1;
            y = 2;
            swap(x, y);
            print(x, " ", y);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["2 1"]);
}

#[test]
fn byval_argument_does_not_mutate_caller_variable() {
    let output = run(
        r#"
        func bump(n) {
            n = n + 1;
        }
        func main() {
            x = 1;
            bump(x);
            print(x);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["1"]);
}

#[test]
fn closure_captures_a_snapshot_not_a_live_reference() {
    let output = run(
        r#"
        func make_adder(x) {
            return lambda(y) { return x + y; };
        }
        func main() {
            x = 100;
            add5 = make_adder(5);
            x = 999;
            print(add5(1));
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["6"]);
}

#[test]
fn closure_over_shared_counter_observes_its_own_mutations_across_calls() {
    let output = run(
        r#"
        func make_counter() {
            n = 0;
            return lambda() {
                n = n + 1;
                return n;
            };
        }
        func main() {
            counter = make_counter();
            print(counter());
            print(counter());
            print(counter());
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["1", "2", "3"]);
}

#[test]
fn overload_dispatch_picks_the_function_matching_argument_count() {
    let output = run(
        r#"
        func greet() { print("hi"); }
        func greet(name) { print("hi ", name); }
        func main() {
            greet();
            greet("ada");
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["hi", "hi ada"]);
}

#[test]
fn referencing_an_overloaded_name_as_a_value_is_a_name_error() {
    let err = run(
        r#"
        func f() { return 1; }
        func f(x) { return x; }
        func main() {
            g = f;
            print(g);
        }
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, BrewinError::Runtime(EvalError::Name(_))));
}

#[test]
fn calling_an_overloaded_name_with_no_matching_arity_is_a_name_error() {
    let err = run(
        r#"
        func f() { return 1; }
        func f(x) { return x; }
        func main() {
            print(f(1, 2));
        }
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, BrewinError::Runtime(EvalError::Name(_))));
}

#[test]
fn calling_a_non_overloaded_function_with_wrong_arity_is_a_type_error() {
    let err = run(
        r#"
        func f(x) { return x; }
        func main() {
            print(f(1, 2));
        }
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, BrewinError::Runtime(EvalError::Type(_))));
}

#[test]
fn plain_assignment_of_an_object_shares_identity() {
    let output = run(
        r#"
        func make() {
            o = @;
            o.x = 1;
            return o;
        }
        func main() {
            a = make();
            b = a;
            b.x = 2;
            print(a.x);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["2"]);
}

#[test]
fn byval_object_argument_is_deep_copied_so_mutation_does_not_escape() {
    let output = run(
        r#"
        func mutate(obj) {
            obj.x = 99;
        }
        func main() {
            c = @;
            c.x = 1;
            mutate(c);
            print(c.x);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["1"]);
}

#[test]
fn refarg_object_argument_shares_identity_so_mutation_does_escape() {
    let output = run(
        r#"
        func mutate(refarg obj) {
            obj.x = 99;
        }
        func main() {
            c = @;
            c.x = 1;
            mutate(c);
            print(c.x);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["99"]);
}

#[test]
fn int_bool_coercion_lets_an_int_drive_a_condition() {
    let output = run(
        r#"
        func main() {
            x = 1;
            if (x) {
                print("truthy");
            } else {
                print("falsy");
            }
            y = 0;
            while (y) {
                print("unreachable");
            }
            print("done");
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["truthy", "done"]);
}

#[test]
fn a_string_condition_is_a_type_error() {
    let err = run(
        r#"
        func main() {
            if ("yes") {
                print("bad");
            }
        }
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, BrewinError::Runtime(EvalError::Type(_))));
}

#[test]
fn equality_coerces_int_and_bool_but_inequality_does_not_share_that_coercion() {
    let output = run(
        r#"
        func main() {
            print(1 == true);
            print(1 != true);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["true", "true"]);
}

#[test]
fn while_loop_variable_persists_across_iterations() {
    let output = run(
        r#"
        func main() {
            i = 0;
            sum = 0;
            while (i < 5) {
                sum = sum + i;
                i = i + 1;
            }
            print(sum);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["10"]);
}

#[test]
fn method_call_binds_this_to_the_receiver_object() {
    // Method calls are statement-only (no `mcall` in expression position),
    // so `this`-binding is observed through a side effect instead of a
    // consumed return value.
    let output = run(
        r#"
        func main() {
            o = @;
            o.x = 10;
            o.get_x = lambda() { this.y = this.x; };
            o.get_x();
            print(o.y);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, ["10"]);
}

#[test]
fn undefined_variable_read_is_a_name_error() {
    let err = run("func main() { print(never_defined); }").unwrap_err();
    assert!(matches!(err, BrewinError::Runtime(EvalError::Name(_))));
}

#[test]
fn division_by_zero_is_an_arithmetic_error() {
    let err = run("func main() { print(1 / 0); }").unwrap_err();
    assert!(matches!(err, BrewinError::Runtime(EvalError::Arithmetic(_))));
}

#[test]
fn inputi_reads_and_echoes_an_integer() {
    let mut host = CollectedIo::new(["42".to_owned()]);
    run_source("func main() { x = inputi(); print(x + 1); }", &mut host).unwrap();
    assert_eq!(host.into_output(), ["43"]);
}

#[test]
fn deeply_recursive_program_fails_with_recursion_limit_instead_of_crashing() {
    let err = run(
        r#"
        func loop(n) {
            return loop(n + 1);
        }
        func main() {
            print(loop(0));
        }
        "#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BrewinError::Runtime(EvalError::RecursionLimit { .. })
    ));
}
