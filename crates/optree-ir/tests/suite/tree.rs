use optree_ir::{dump, dump_op, dump_with, lower_body_with, DumpOptions, LowerConfig, OperationKind};
use optree_syntax::{BinaryOp, Declarator, ExprKind, StmtId, StmtKind, SyntaxBody, SyntaxBuilder};
use optree_types::{CallResolution, ParamDefault, Signature, Type};

use super::{lower, p};

/// `{ int x = M(1); x += 2; }` with `int M(int a, int b = 0)`.
fn sample() -> (SyntaxBody, Vec<StmtId>) {
    let sig = Signature::method(p(), "M", Type::int())
        .param("a", Type::int())
        .optional("b", Type::int(), ParamDefault::DefaultOf);
    let source = "{ int x = M(1); x += 2; }";
    let mut b = SyntaxBuilder::new(source).with_this_type(p());
    let x = b.local("x", Type::int(), b.span("x"));
    let one = b.int(1, b.span("1"));
    let args = vec![b.arg(one)];
    let call = b.call(None, "M", args, CallResolution::resolved(sig), b.span("M(1)"));
    let declaration = b.stmt(
        StmtKind::LocalDecl(vec![Declarator {
            local: x,
            initializer: Some(call),
            span: b.span("x = M(1)"),
        }]),
        b.span("int x = M(1);"),
    );
    let target = b.local_ref(x, b.span_nth("x", 1));
    let two = b.int(2, b.span("2"));
    let compound = b.expr(
        ExprKind::Assignment {
            target,
            value: two,
            op: Some(BinaryOp::Add),
        },
        b.span("x += 2"),
    );
    let update = b.expr_stmt(compound);
    let statements = vec![declaration, update];
    let root = b.block(statements.clone(), b.span(source));
    (b.finish(root), statements)
}

#[test]
fn every_operation_but_the_root_has_one_parent() {
    let (body, _) = sample();
    let result = lower(&body);
    let tree = &result.tree;

    assert_eq!(tree.parent(tree.root()), None);
    for (id, _) in tree.iter() {
        if id == tree.root() {
            continue;
        }
        let parent = tree.parent(id).expect("non-root operation has a parent");
        let siblings = tree.children(parent);
        assert_eq!(siblings.iter().filter(|&&child| child == id).count(), 1);
    }
}

#[test]
fn root_reaches_every_operation() {
    let (body, _) = sample();
    let result = lower(&body);
    let tree = &result.tree;

    let mut reached = tree.descendants(tree.root());
    assert_eq!(reached[0], tree.root());
    reached.sort();
    reached.dedup();
    assert_eq!(reached.len(), tree.len());
}

#[test]
fn ancestors_walk_up_to_the_root() {
    let (body, statements) = sample();
    let result = lower(&body);
    let tree = &result.tree;

    let declaration = tree.operation_for_stmt(statements[0]).expect("declaration");
    let literal = tree
        .descendants(declaration)
        .into_iter()
        .find(|&id| tree.op(id).kind() == OperationKind::Literal && !tree.op(id).is_implicit)
        .expect("literal argument");
    let kinds: Vec<_> = tree
        .ancestors(literal)
        .map(|id| tree.op(id).kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            OperationKind::Argument,
            OperationKind::Invocation,
            OperationKind::VariableDeclarator,
            OperationKind::VariableDeclarationGroup,
            OperationKind::Block,
        ]
    );
}

#[test]
fn dump_is_deterministic() {
    let (body, _) = sample();
    let first = lower(&body);
    let second = lower(&body);

    assert_eq!(dump(&first.tree), dump(&first.tree));
    assert_eq!(dump(&first.tree), dump(&second.tree));
    assert!(!first.has_errors());
}

#[test]
fn dump_of_subtree_starts_at_column_zero() {
    let (body, statements) = sample();
    let result = lower(&body);
    let update = result
        .tree
        .operation_for_stmt(statements[1])
        .expect("update");

    pretty_assertions::assert_eq!(
        dump_op(&result.tree, update),
        "\
ExpressionStatement (Type: null) (Syntax: 'x += 2')
  CompoundAssignment (Operator: Add) (Type: int) (Syntax: 'x += 2')
    Left:
      LocalReference (Local: x) (Type: int) (Syntax: 'x')
    Right:
      Literal (Type: int, Constant: 2) (Syntax: '2')
"
    );
}

#[test]
fn spans_are_appended_on_request() {
    let (body, _) = sample();
    let result = lower(&body);

    let text = dump_with(&result.tree, &DumpOptions { show_spans: true });
    let first = text.lines().next().expect("root line");
    assert!(first.ends_with("[0..25]"), "{first}");
    assert!(text
        .lines()
        .filter(|line| line.contains("(Syntax:"))
        .all(|line| line.ends_with(']')));
    assert!(!dump(&result.tree).contains("[0..25]"));
}

#[test]
fn cancellation_hook_runs_for_each_statement() {
    let (body, _) = sample();
    let mut calls = 0;
    let result = lower_body_with(&body, &LowerConfig::default(), &mut || calls += 1);

    // The block and its two statements.
    assert_eq!(calls, 3);
    assert_eq!(result.tree.op(result.tree.root()).kind(), OperationKind::Block);
}

#[test]
fn block_lists_declared_locals() {
    let (body, _) = sample();
    let text = dump(&lower(&body).tree);
    assert!(text.starts_with(
        "Block (Type: null) (Syntax: '{ int x = M(1); x += 2; }')\n  Locals: int x\n  Statements(2):\n"
    ));
}

#[test]
fn statements_map_back_to_their_operations() {
    let (body, statements) = sample();
    let result = lower(&body);

    for stmt in statements {
        let op = result.tree.operation_for_stmt(stmt).expect("statement lowered");
        assert_eq!(result.tree.op(op).span, body.stmt(stmt).span);
        assert!(result.tree.op(op).kind().is_statement());
    }
}
