//! End-to-end programs exercising the full pipeline, mirroring the reference
//! scenarios: arithmetic precedence, short-circuit conditions, loops, and
//! the two flavors of `case`. Since invoking an external C compiler is out
//! of scope, each scenario is checked via the generated C's structure and
//! quad order rather than its executed stdout.

use cimple_ir::Op;
use cimple_compiler::{compile, parser::Parser};
use indoc::indoc;

fn quad_ops(source: &str) -> Vec<Op> {
    let mut parser = Parser::new(source).unwrap();
    parser.parse_program().unwrap();
    parser.into_output().quads.iter().map(|q| q.op).collect()
}

fn print_count(ops: &[Op]) -> usize {
    ops.iter().filter(|op| **op == Op::Out).count()
}

#[test]
fn arithmetic_precedence_emits_one_print_per_statement() {
    let source = indoc! {"
        program demo
        {
            print(1+5*5);
            print((1+5)*5);
            print(1+5/5*5);
            print(-5*5+5);
            print((10+20*5/5)/3-5*10)
        }.
    "};
    let ops = quad_ops(source);
    assert_eq!(print_count(&ops), 5);
    // '1+5*5' must multiply before it adds: Mul precedes the Add feeding print.
    let mul_idx = ops.iter().position(|op| *op == Op::Mul).unwrap();
    let add_idx = ops.iter().position(|op| *op == Op::Add).unwrap();
    assert!(mul_idx < add_idx);
}

#[test]
fn simple_arithmetic_compiles_and_generates_c() {
    let source = indoc! {"
        program demo
        {
            declare a, b;
            a := 10;
            b := 15;
            print(a+b);
            print(a-b);
            print(b/a);
            print(b*a)
        }.
    "};
    let result = compile(source, true).unwrap();
    let c = result.c.unwrap();
    assert_eq!(c.matches("printf(").count(), 4);
    assert!(c.contains("a + b"));
    assert!(c.contains("a - b"));
    assert!(c.contains("b / a"));
    assert!(c.contains("b * a"));
}

#[test]
fn short_circuit_conditions_translate_relops_and_gotos() {
    let source = indoc! {"
        program demo
        {
            declare a, b;
            a := 10;
            b := 5;
            if(a<b){print(1)};
            if(a>b){print(2)};
            if(a<b or a>b){print(3)};
            if(a>b or a<b and a=100){print(4)};
            if([a>b or a<b] and [a=100]){print(5)};
            if(not[a=b or a<b] and not[a=100]){print(6)}
        }.
    "};
    let result = compile(source, true).unwrap();
    let c = result.c.unwrap();
    assert_eq!(c.matches("printf(").count(), 6);
    assert!(c.contains("a < b"));
    assert!(c.contains("a > b"));
    assert!(c.contains("goto L_"));
}

#[test]
fn while_loop_jumps_back_to_its_condition() {
    let source = indoc! {"
        program demo
        {
            declare a, b;
            a := 1;
            b := 5;
            while(a<b){print(a); a:=a+1}
        }.
    "};
    let ops = quad_ops(source);
    assert_eq!(print_count(&ops), 1);
    // One jump closes the loop body back to the condition, besides the
    // relop's own fallthrough jump.
    assert_eq!(ops.iter().filter(|op| **op == Op::Jump).count(), 2);
}

#[test]
fn switchcase_is_first_match_only_one_case_body_runs() {
    let source = indoc! {"
        program demo
        {
            declare a, b;
            a := 11;
            b := 11;
            switchcase
            case(a<b){print(1)}
            case(a=b){print(2)}
            case(a>b){print(3)}
            default{print(4)};
            switchcase
            case(a=1){print(5)}
            case(a=2){print(6)}
            case(a=3){print(7)}
            default{print(8)}
        }.
    "};
    let ops = quad_ops(source);
    // 2 switchcase statements, 4 cases + default each => 8 prints total,
    // one per case body, none repeated.
    assert_eq!(print_count(&ops), 8);
}

#[test]
fn forcase_restarts_the_case_chain_until_a_pass_fires_nothing() {
    let source = indoc! {"
        program demo
        {
            declare a, b;
            a := 1;
            b := 3;
            forcase
            case(a<b){print(a); print(b); a:=a+1}
            case(b>a){print(a); print(b); b:=b-1}
            default{print(100)}
        }.
    "};
    let ops = quad_ops(source);
    // Each case body prints twice and default prints once; forcase itself
    // only lowers one pass through the chain (looping is a runtime effect
    // of the jump back to the first case, not additional quads).
    assert_eq!(print_count(&ops), 5);
}

#[test]
fn incase_uses_a_flag_temporary_and_loops_back_through_eq() {
    let source = indoc! {"
        program demo
        {
            declare a;
            a := 1;
            incase
            case(a<10){a:=a+1}
        }.
    "};
    let ops = quad_ops(source);
    // flag := 0, case body, flag := 1, final `flag = 1 -> L_first`.
    assert_eq!(ops.iter().filter(|op| **op == Op::Assign).count(), 3);
    assert_eq!(ops.iter().filter(|op| **op == Op::Eq).count(), 2);
}

#[test]
fn function_call_emits_ret_param_before_call() {
    let source = indoc! {"
        program demo
        {
            declare a;
            function double(in x)
            {
                declare y;
                y := x * 2;
                return(y)
            }
            a := double(in 5);
            print(a)
        }.
    "};
    let result = compile(source, false).unwrap();
    assert!(result.assembly.contains("jal double"));
}

#[test]
fn call_site_steps_sp_by_the_callers_own_frame_length_not_the_callees() {
    // main's frame holds 4 declared locals (offset 12 -> 28) plus the `T_1`
    // RET-binding temporary `double(in 5)` plants in main's own scope
    // (28 -> 32), for a final frame length of 32. `double`'s own frame (1
    // param, 1 local, 1 temp for `x * 2`: offset 12 -> 24) is smaller. The
    // `addi`s straddling `jal` must use the caller's 32, not the callee's
    // 24 — a caller steps over its *own* frame to place the callee's record.
    let source = indoc! {"
        program demo
        {
            declare a, b, c, d;
            function double(in x)
            {
                declare y;
                y := x * 2;
                return(y)
            }
            a := double(in 5);
            print(a)
        }.
    "};
    let result = compile(source, false).unwrap();
    let lines: Vec<&str> = result.assembly.lines().map(str::trim).collect();
    let jal_idx = lines.iter().position(|l| l.contains("jal double")).unwrap();
    assert_eq!(lines[jal_idx - 1], "addi sp,sp,32");
    assert_eq!(lines[jal_idx + 1], "addi sp,sp,-32");
}

#[test]
fn gen_c_is_rejected_once_any_subprogram_is_declared() {
    let source = indoc! {"
        program demo
        {
            declare a;
            procedure bump(inout x)
            {
                x := x + 1
            }
            a := 0;
            call bump(inout a);
            print(a)
        }.
    "};
    let err = compile(source, true).unwrap_err();
    assert!(err.to_string().contains("Cannot generate C code"));
}

#[test]
fn passing_a_global_variable_by_reference_addresses_it_through_gp() {
    let source = indoc! {"
        program g
        {
            declare total;
            procedure bump(inout x)
            {
                x := x + 1
            }
            total := 0;
            call bump(inout total)
        }.
    "};
    let result = compile(source, false).unwrap();
    assert!(result.assembly.contains("addi t0,gp,-"));
}

#[test]
fn nested_procedure_mutates_grandparent_inout_through_chased_static_link() {
    let source = indoc! {"
        program g
        {
            declare w;
            procedure outer(inout z)
            {
                procedure middle()
                {
                    procedure inner()
                    {
                        z := 99
                    }
                    call inner()
                }
                call middle()
            }
            w := 0;
            call outer(inout w)
        }.
    "};
    let result = compile(source, false).unwrap();
    assert!(result.assembly.contains("lw t0,(t0)"));
    assert!(result.assembly.contains("sw t1,(t0)"));
}

#[test]
fn nested_function_call_as_an_actual_keeps_its_own_positional_index() {
    // `g`'s second actual is itself a call to `f`. Lowering `f(2)` must not
    // disturb the positional index `g`'s own two `par` quads were assigned:
    // each call's actuals are numbered from its own `parse_call_arguments`
    // invocation, not by a flat left-to-right scan of the whole quad list.
    use cimple_ir::{Operand, PassMode};

    let source = indoc! {"
        program p
        {
            function f(in n)
            {
                return(n)
            }
            function g(in x, in y)
            {
                return(x+y)
            }
            declare r;
            r := g(in f(1), in f(2))
        }.
    "};
    let mut parser = Parser::new(source).unwrap();
    parser.parse_program().unwrap();
    let quads = parser.into_output().quads;

    let cv_indices: Vec<u32> = quads
        .iter()
        .filter(|q| q.op == Op::Par && q.y == Operand::Mode(PassMode::Cv))
        .map(|q| match q.z {
            Operand::IntLit(n) => n,
            _ => panic!("CV par quad must carry its positional index"),
        })
        .collect();

    // Four CV actuals total: f(1)'s single arg, f(2)'s single arg, and g's
    // two arguments — each call's own arguments start counting from 0.
    assert_eq!(cv_indices, vec![0, 0, 0, 1]);
}
