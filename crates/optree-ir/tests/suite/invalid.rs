use optree_ir::{OperationData, OperationKind};
use optree_syntax::{ExprKind, SyntaxBuilder};
use optree_types::{
    ArgConversions, CallResolution, ConstValue, Conversion, FailureReason, Signature, Span, Type,
};

use super::{assert_dump, lower, p};

fn codes(result: &optree_ir::LowerResult) -> Vec<&'static str> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn assigning_through_get_only_indexer_keeps_receiver_and_arguments() {
    let indexer = Signature::indexer(p(), Type::int())
        .param("i", Type::int())
        .with_accessors(true, false);
    let mut b = SyntaxBuilder::new("this[10] = 1").with_this_type(p());
    let this = b.expr(ExprKind::This, b.span("this"));
    let ten = b.int(10, b.span("10"));
    let args = vec![b.arg(ten)];
    let target = b.expr(
        ExprKind::ElementAccess {
            receiver: this,
            args,
            resolution: CallResolution::resolved(indexer),
        },
        b.span("this[10]"),
    );
    let one = b.int(1, b.span("1"));
    let assignment = b.expr(
        ExprKind::Assignment {
            target,
            value: one,
            op: None,
        },
        b.span("this[10] = 1"),
    );
    let root = b.expr_stmt(assignment);
    let result = lower(&b.finish(root));

    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null, IsInvalid) (Syntax: 'this[10] = 1')
  SimpleAssignment (Type: int, IsInvalid) (Syntax: 'this[10] = 1')
    Left:
      Invalid (Type: int, IsInvalid) (Syntax: 'this[10]')
        Children(2):
          [0] InstanceReference (Type: P) (Syntax: 'this')
          [1] Literal (Type: int, Constant: 10) (Syntax: '10')
    Right:
      Literal (Type: int, Constant: 1) (Syntax: '1')
"#,
    );
    assert_eq!(codes(&result), vec!["OPS_ACCESSOR"]);
    assert!(result.diagnostics[0].message.contains("no set accessor"));
}

#[test]
fn missing_argument_syntax_binds_as_invalid_value() {
    let sig = Signature::method(p(), "M2", Type::Void)
        .param("x", Type::int())
        .param("y", Type::int());
    let mut b = SyntaxBuilder::new("M2(1,)").with_this_type(p());
    let one = b.int(1, b.span("1"));
    let missing = b.expr(ExprKind::Missing, Span::new(5, 5));
    let args = vec![b.arg(one), b.arg(missing)];
    let call = b.call(None, "M2", args, CallResolution::resolved(sig), b.span("M2(1,)"));
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null, IsInvalid) (Syntax: 'M2(1,)')
  Invocation (void P.M2(int x, int y)) (Type: null, IsInvalid) (Syntax: 'M2(1,)')
    Instance Receiver:
      InstanceReference (Type: P, IsImplicit) (Syntax: 'M2(1,)')
    Arguments(2):
      [0] Argument (Explicit, Parameter: x) (Type: null) (Syntax: '1')
        Literal (Type: int, Constant: 1) (Syntax: '1')
      [1] Argument (Explicit, Parameter: y) (Type: null, IsInvalid) (Syntax: '')
        Invalid (Type: ?, IsInvalid) (Syntax: '')
          Children(0)
"#,
    );
    assert_eq!(codes(&result), vec!["OPS_MISSING_SYNTAX"]);
}

#[test]
fn unresolved_call_keeps_argument_values() {
    let mut b = SyntaxBuilder::new("Foo(1, x)");
    let x = b.local("x", Type::int(), b.span("x"));
    let one = b.int(1, b.span("1"));
    let x_ref = b.local_ref(x, b.span("x"));
    let args = vec![b.arg(one), b.arg(x_ref)];
    let call = b.call(
        None,
        "Foo",
        args,
        CallResolution::unresolved(FailureReason::UnknownMember),
        b.span("Foo(1, x)"),
    );
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null, IsInvalid) (Syntax: 'Foo(1, x)')
  Invalid (Type: ?, IsInvalid) (Syntax: 'Foo(1, x)')
    Children(2):
      [0] Literal (Type: int, Constant: 1) (Syntax: '1')
      [1] LocalReference (Local: x) (Type: int) (Syntax: 'x')
"#,
    );
    assert_eq!(codes(&result), vec!["OPS_UNRESOLVED_MEMBER"]);
    assert_eq!(
        result.diagnostics[0].message,
        "cannot resolve `Foo`: member not found"
    );
}

#[test]
fn unresolved_call_uses_candidate_result_type() {
    let candidate = Signature::method(p(), "Foo", Type::string()).param("x", Type::int());
    let mut b = SyntaxBuilder::new("Foo()").with_this_type(p());
    let call = b.call(
        None,
        "Foo",
        Vec::new(),
        CallResolution::unresolved_with_candidate(FailureReason::Ambiguous, candidate),
        b.span("Foo()"),
    );
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    let op = result.tree.operation_for_expr(call).expect("lowered");
    assert_eq!(result.tree.op(op).kind(), OperationKind::Invalid);
    assert_eq!(result.tree.op(op).ty, Some(Type::string()));
}

#[test]
fn inconvertible_argument_is_wrapped_in_invalid_conversion() {
    let sig = Signature::method(p(), "M", Type::Void)
        .param("x", Type::int())
        .into_static();
    let mut b = SyntaxBuilder::new(r#"M("s")"#);
    let s = b.literal(ConstValue::String("s".into()), b.span(r#""s""#));
    let args = vec![b.arg(s)];
    let call = b.call(
        None,
        "M",
        args,
        CallResolution::resolved(sig)
            .with_conversions(vec![ArgConversions::input(Conversion::none())]),
        b.span(r#"M("s")"#),
    );
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null, IsInvalid) (Syntax: 'M("s")')
  Invalid (Type: null, IsInvalid) (Syntax: 'M("s")')
    Children(1):
      [0] Conversion (Conversion: NoConversion) (Type: int, IsInvalid, IsImplicit) (Syntax: '"s"')
        Operand:
          Literal (Type: string, Constant: "s") (Syntax: '"s"')
"#,
    );
    assert_eq!(codes(&result), vec!["OPS_ARGUMENT_BINDING"]);
    assert!(result.diagnostics[0]
        .message
        .starts_with("cannot call `void P.M(int x)`"));
}

#[test]
fn too_many_arguments_fail_binding() {
    let sig = Signature::method(p(), "M", Type::Void)
        .param("x", Type::int())
        .into_static();
    let mut b = SyntaxBuilder::new("M(1, 2)");
    let one = b.int(1, b.span("1"));
    let two = b.int(2, b.span("2"));
    let args = vec![b.arg(one), b.arg(two)];
    let call = b.call(None, "M", args, CallResolution::resolved(sig), b.span("M(1, 2)"));
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    let op = result.tree.operation_for_expr(call).expect("lowered");
    let OperationData::Invalid { children } = &result.tree.op(op).data else {
        panic!("expected invalid call");
    };
    assert_eq!(children.len(), 2);
    assert_eq!(codes(&result), vec!["OPS_ARGUMENT_BINDING"]);
}

#[test]
fn instance_method_through_type_name_is_invalid() {
    let sig = Signature::method(p(), "M", Type::Void).param("x", Type::int());
    let mut b = SyntaxBuilder::new("P.M(1)").with_this_type(p());
    let ty = b.expr(ExprKind::TypeName(p()), b.span("P"));
    let one = b.int(1, b.span("1"));
    let args = vec![b.arg(one)];
    let call = b.call(Some(ty), "M", args, CallResolution::resolved(sig), b.span("P.M(1)"));
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null, IsInvalid) (Syntax: 'P.M(1)')
  Invalid (Type: null, IsInvalid) (Syntax: 'P.M(1)')
    Children(1):
      [0] Literal (Type: int, Constant: 1) (Syntax: '1')
"#,
    );
    assert_eq!(codes(&result), vec!["OPS_INVALID_RECEIVER"]);
}

#[test]
fn static_method_through_instance_is_invalid() {
    let sig = Signature::method(p(), "S", Type::Void).into_static();
    let mut b = SyntaxBuilder::new("p.S()");
    let local = b.local("p", p(), b.span("p"));
    let receiver = b.local_ref(local, b.span("p"));
    let call = b.call(
        Some(receiver),
        "S",
        Vec::new(),
        CallResolution::resolved(sig),
        b.span("p.S()"),
    );
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    let op = result.tree.operation_for_expr(call).expect("lowered");
    let receiver_op = result.tree.operation_for_expr(receiver).expect("receiver");
    assert_eq!(result.tree.children(op), vec![receiver_op]);
    assert_eq!(codes(&result), vec!["OPS_INVALID_RECEIVER"]);
}

#[test]
fn unresolved_name_is_an_invalid_leaf() {
    let mut b = SyntaxBuilder::new("y = 1");
    let name = b.expr(ExprKind::Name("y".into()), b.span("y"));
    let one = b.int(1, b.span("1"));
    let assignment = b.expr(
        ExprKind::Assignment {
            target: name,
            value: one,
            op: None,
        },
        b.span("y = 1"),
    );
    let root = b.expr_stmt(assignment);
    let result = lower(&b.finish(root));

    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null, IsInvalid) (Syntax: 'y = 1')
  SimpleAssignment (Type: ?, IsInvalid) (Syntax: 'y = 1')
    Left:
      Invalid (Type: ?, IsInvalid) (Syntax: 'y')
        Children(0)
    Right:
      Literal (Type: int, Constant: 1) (Syntax: '1')
"#,
    );
    assert_eq!(codes(&result), vec!["OPS_UNRESOLVED_NAME"]);
}

#[test]
fn this_in_static_context_reports_receiver_error() {
    let mut b = SyntaxBuilder::new("this");
    let this = b.expr(ExprKind::This, b.span("this"));
    let root = b.expr_stmt(this);
    let result = lower(&b.finish(root));

    let op = result.tree.operation_for_expr(this).expect("lowered");
    assert_eq!(result.tree.op(op).ty, Some(Type::Error));
    assert!(result.has_errors());
    assert_eq!(codes(&result), vec!["OPS_INVALID_RECEIVER"]);
}

#[test]
fn invalid_flag_propagates_to_every_ancestor() {
    let mut b = SyntaxBuilder::new("Foo()");
    let call = b.call(
        None,
        "Foo",
        Vec::new(),
        CallResolution::unresolved(FailureReason::UnknownMember),
        b.span("Foo()"),
    );
    let stmt = b.expr_stmt(call);
    let root = b.block(vec![stmt], b.span("Foo()"));
    let result = lower(&b.finish(root));

    let invalid = result.tree.operation_for_expr(call).expect("lowered");
    for ancestor in result.tree.ancestors(invalid) {
        assert!(result.tree.has_errors(ancestor));
    }
    assert!(result.tree.has_errors(result.tree.root()));
}
