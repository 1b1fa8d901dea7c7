use optree_ir::{
    lower_body, ArgumentKind, ArgumentOrder, LowerConfig, OperationData, OperationKind,
};
use optree_syntax::{ExprKind, SyntaxBuilder};
use optree_types::{
    ArgConversions, CallResolution, ConstValue, Conversion, ConversionKind, ParamDefault,
    ParamsForm, Signature, Type,
};

use super::{assert_dump, lower, p};

fn m2_with_defaults() -> Signature {
    Signature::method(p(), "M2", Type::Void)
        .optional("x", Type::int(), ParamDefault::Constant(ConstValue::Int(1)))
        .optional("y", Type::int(), ParamDefault::Constant(ConstValue::Int(2)))
        .optional("z", Type::int(), ParamDefault::Constant(ConstValue::Int(3)))
}

fn named_call_body() -> optree_syntax::SyntaxBody {
    let mut b = SyntaxBuilder::new("M2(z: 2, x: 9)").with_this_type(p());
    let two = b.int(2, b.span("2"));
    let nine = b.int(9, b.span("9"));
    let args = vec![
        b.named_arg("z", two, b.span("z: 2")),
        b.named_arg("x", nine, b.span("x: 9")),
    ];
    let call = b.call(
        None,
        "M2",
        args,
        CallResolution::resolved(m2_with_defaults()),
        b.span("M2(z: 2, x: 9)"),
    );
    let root = b.expr_stmt(call);
    b.finish(root)
}

#[test]
fn named_arguments_keep_call_site_order_then_defaults() {
    let result = lower(&named_call_body());
    assert!(result.diagnostics.is_empty());
    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null) (Syntax: 'M2(z: 2, x: 9)')
  Invocation (void P.M2(int x = 1, int y = 2, int z = 3)) (Type: null) (Syntax: 'M2(z: 2, x: 9)')
    Instance Receiver:
      InstanceReference (Type: P, IsImplicit) (Syntax: 'M2(z: 2, x: 9)')
    Arguments(3):
      [0] Argument (Explicit, Parameter: z) (Type: null) (Syntax: 'z: 2')
        Literal (Type: int, Constant: 2) (Syntax: '2')
      [1] Argument (Explicit, Parameter: x) (Type: null) (Syntax: 'x: 9')
        Literal (Type: int, Constant: 9) (Syntax: '9')
      [2] Argument (DefaultValue, Parameter: y) (Type: null, IsImplicit) (Syntax: 'M2(z: 2, x: 9)')
        Literal (Type: int, Constant: 2, IsImplicit) (Syntax: 'M2(z: 2, x: 9)')
"#,
    );
}

#[test]
fn parameter_order_lists_arguments_by_declaration() {
    let config = LowerConfig {
        argument_order: ArgumentOrder::Parameter,
    };
    let result = lower_body(&named_call_body(), &config);
    let (_, invocation) = result
        .tree
        .iter()
        .find(|(_, op)| op.kind() == OperationKind::Invocation)
        .expect("invocation");
    let OperationData::Invocation { arguments, .. } = &invocation.data else {
        unreachable!()
    };

    let bound: Vec<(String, ArgumentKind)> = arguments
        .iter()
        .map(|&arg| match &result.tree.op(arg).data {
            OperationData::Argument {
                kind, parameter, ..
            } => (
                parameter.as_ref().expect("parameter").name.clone(),
                *kind,
            ),
            other => panic!("expected argument, got {other:?}"),
        })
        .collect();
    assert_eq!(
        bound,
        vec![
            ("x".to_string(), ArgumentKind::Explicit),
            ("y".to_string(), ArgumentKind::DefaultValue),
            ("z".to_string(), ArgumentKind::Explicit),
        ]
    );
}

#[test]
fn omitted_params_array_becomes_empty_array_creation() {
    let sig = Signature::method(p(), "M2", Type::Void)
        .param("x", Type::int())
        .params_array("array", Type::array(Type::double()));
    let mut b = SyntaxBuilder::new("M2(1)").with_this_type(p());
    let one = b.int(1, b.span("1"));
    let args = vec![b.arg(one)];
    let call = b.call(None, "M2", args, CallResolution::resolved(sig), b.span("M2(1)"));
    let root = b.expr_stmt(call);

    assert_dump(
        &lower(&b.finish(root)),
        r#"
ExpressionStatement (Type: null) (Syntax: 'M2(1)')
  Invocation (void P.M2(int x, params double[] array)) (Type: null) (Syntax: 'M2(1)')
    Instance Receiver:
      InstanceReference (Type: P, IsImplicit) (Syntax: 'M2(1)')
    Arguments(2):
      [0] Argument (Explicit, Parameter: x) (Type: null) (Syntax: '1')
        Literal (Type: int, Constant: 1) (Syntax: '1')
      [1] Argument (ParamArray, Parameter: array) (Type: null, IsImplicit) (Syntax: 'M2(1)')
        ArrayCreation (Type: double[], IsImplicit) (Syntax: 'M2(1)')
          Dimension Sizes(1):
            [0] Literal (Type: int, Constant: 0, IsImplicit) (Syntax: 'M2(1)')
          Initializer:
            ArrayInitializer (Type: null, IsImplicit) (Syntax: 'M2(1)')
              Element Values(0)
"#,
    );
}

#[test]
fn expanded_params_elements_carry_their_conversions() {
    let sig = Signature::method(p(), "M", Type::Void)
        .params_array("values", Type::array(Type::double()))
        .into_static();
    let numeric = ArgConversions::input(Conversion::new(ConversionKind::ImplicitNumeric));
    let mut b = SyntaxBuilder::new("M(1, 2)");
    let one = b.int(1, b.span("1"));
    let two = b.int(2, b.span("2"));
    let args = vec![b.arg(one), b.arg(two)];
    let call = b.call(
        None,
        "M",
        args,
        CallResolution::resolved(sig).with_conversions(vec![numeric.clone(), numeric]),
        b.span("M(1, 2)"),
    );
    let root = b.expr_stmt(call);

    assert_dump(
        &lower(&b.finish(root)),
        r#"
ExpressionStatement (Type: null) (Syntax: 'M(1, 2)')
  Invocation (void P.M(params double[] values)) (Type: null) (Syntax: 'M(1, 2)')
    Instance Receiver: null
    Arguments(1):
      [0] Argument (ParamArray, Parameter: values) (Type: null, IsImplicit) (Syntax: '1, 2')
        ArrayCreation (Type: double[], IsImplicit) (Syntax: '1, 2')
          Dimension Sizes(1):
            [0] Literal (Type: int, Constant: 2, IsImplicit) (Syntax: '1, 2')
          Initializer:
            ArrayInitializer (Type: null, IsImplicit) (Syntax: '1, 2')
              Element Values(2):
                [0] Conversion (Conversion: ImplicitNumeric) (Type: double, IsImplicit) (Syntax: '1')
                  Operand:
                    Literal (Type: int, Constant: 1) (Syntax: '1')
                [1] Conversion (Conversion: ImplicitNumeric) (Type: double, IsImplicit) (Syntax: '2')
                  Operand:
                    Literal (Type: int, Constant: 2) (Syntax: '2')
"#,
    );
}

#[test]
fn covariant_array_passes_in_normal_form() {
    let sig = Signature::method(p(), "M", Type::Void)
        .params_array("items", Type::array(Type::class("Base")))
        .into_static();
    let mut b = SyntaxBuilder::new("M(derived)");
    let local = b.local("derived", Type::array(Type::class("Derived")), b.span("derived"));
    let value = b.local_ref(local, b.span("derived"));
    let args = vec![b.arg(value)];
    let call = b.call(
        None,
        "M",
        args,
        CallResolution::resolved(sig)
            .with_conversions(vec![ArgConversions::input(Conversion::new(
                ConversionKind::ImplicitReference,
            ))])
            .with_params_form(ParamsForm::Normal),
        b.span("M(derived)"),
    );
    let root = b.expr_stmt(call);

    assert_dump(
        &lower(&b.finish(root)),
        r#"
ExpressionStatement (Type: null) (Syntax: 'M(derived)')
  Invocation (void P.M(params Base[] items)) (Type: null) (Syntax: 'M(derived)')
    Instance Receiver: null
    Arguments(1):
      [0] Argument (Explicit, Parameter: items) (Type: null) (Syntax: 'derived')
        LocalReference (Local: derived) (Type: Derived[]) (Syntax: 'derived')
        InConversion: ImplicitReference
"#,
    );
}

#[test]
fn signature_ordinals_do_not_index_parameters() {
    let mut sig = Signature::method(p(), "M", Type::Void)
        .param("x", Type::int())
        .into_static();
    sig.params[0].ordinal = 3;
    let mut b = SyntaxBuilder::new("M(1)");
    let one = b.int(1, b.span("1"));
    let args = vec![b.arg(one)];
    let call = b.call(None, "M", args, CallResolution::resolved(sig), b.span("M(1)"));
    let root = b.expr_stmt(call);

    let result = lower(&b.finish(root));
    assert!(!result.has_errors());
    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null) (Syntax: 'M(1)')
  Invocation (void P.M(int x)) (Type: null) (Syntax: 'M(1)')
    Instance Receiver: null
    Arguments(1):
      [0] Argument (Explicit, Parameter: x) (Type: null) (Syntax: '1')
        Literal (Type: int, Constant: 1) (Syntax: '1')
"#,
    );
}

#[test]
fn explicit_argument_prints_its_conversion() {
    let sig = Signature::method(p(), "M", Type::Void)
        .param("d", Type::double())
        .into_static();
    let mut b = SyntaxBuilder::new("M(1)");
    let one = b.int(1, b.span("1"));
    let args = vec![b.arg(one)];
    let call = b.call(
        None,
        "M",
        args,
        CallResolution::resolved(sig).with_conversions(vec![ArgConversions::input(
            Conversion::new(ConversionKind::ImplicitNumeric),
        )]),
        b.span("M(1)"),
    );
    let root = b.expr_stmt(call);

    assert_dump(
        &lower(&b.finish(root)),
        r#"
ExpressionStatement (Type: null) (Syntax: 'M(1)')
  Invocation (void P.M(double d)) (Type: null) (Syntax: 'M(1)')
    Instance Receiver: null
    Arguments(1):
      [0] Argument (Explicit, Parameter: d) (Type: null) (Syntax: '1')
        Literal (Type: int, Constant: 1) (Syntax: '1')
        InConversion: ImplicitNumeric
"#,
    );
}

#[test]
fn extension_receiver_becomes_first_argument() {
    let sig = Signature::method(Type::class("E"), "Ext", Type::Void)
        .param("self", p())
        .param("n", Type::int())
        .extension();
    let mut b = SyntaxBuilder::new("p.Ext(5)");
    let local = b.local("p", p(), b.span("p"));
    let receiver = b.local_ref(local, b.span("p"));
    let five = b.int(5, b.span("5"));
    let args = vec![b.arg(five)];
    let call = b.call(
        Some(receiver),
        "Ext",
        args,
        CallResolution::resolved(sig),
        b.span("p.Ext(5)"),
    );
    let root = b.expr_stmt(call);

    assert_dump(
        &lower(&b.finish(root)),
        r#"
ExpressionStatement (Type: null) (Syntax: 'p.Ext(5)')
  Invocation (void E.Ext(this P self, int n)) (Type: null) (Syntax: 'p.Ext(5)')
    Instance Receiver: null
    Arguments(2):
      [0] Argument (Explicit, Parameter: self) (Type: null, IsImplicit) (Syntax: 'p')
        LocalReference (Local: p) (Type: P) (Syntax: 'p')
      [1] Argument (Explicit, Parameter: n) (Type: null) (Syntax: '5')
        Literal (Type: int, Constant: 5) (Syntax: '5')
"#,
    );
}

#[test]
fn vararg_call_ends_with_arglist_sentinel() {
    let sig = Signature::method(p(), "M", Type::Void)
        .param("x", Type::int())
        .vararg()
        .into_static();
    let mut b = SyntaxBuilder::new("M(1, 2)");
    let one = b.int(1, b.span("1"));
    let two = b.int(2, b.span("2"));
    let args = vec![b.arg(one), b.arg(two)];
    let call = b.call(None, "M", args, CallResolution::resolved(sig), b.span("M(1, 2)"));
    let root = b.expr_stmt(call);

    assert_dump(
        &lower(&b.finish(root)),
        r#"
ExpressionStatement (Type: null) (Syntax: 'M(1, 2)')
  Invocation (void P.M(int x, __arglist)) (Type: null) (Syntax: 'M(1, 2)')
    Instance Receiver: null
    Arguments(3):
      [0] Argument (Explicit, Parameter: x) (Type: null) (Syntax: '1')
        Literal (Type: int, Constant: 1) (Syntax: '1')
      [1] Argument (Explicit, Parameter: null) (Type: null) (Syntax: '2')
        Literal (Type: int, Constant: 2) (Syntax: '2')
      [2] Argument (Explicit, Parameter: null) (Type: null, IsImplicit) (Syntax: 'M(1, 2)')
        ArgList (Type: null, IsImplicit) (Syntax: 'M(1, 2)')
"#,
    );
}

#[test]
fn every_default_value_form_is_synthesized() {
    let sig = Signature::method(p(), "M", Type::Void)
        .optional("s", Type::string(), ParamDefault::Constant(ConstValue::Null))
        .optional("d", Type::structure("S"), ParamDefault::DefaultOf)
        .optional("n", Type::structure("S"), ParamDefault::New)
        .optional(
            "bad",
            Type::int(),
            ParamDefault::Unconvertible(Some(ConstValue::String("x".into()))),
        )
        .into_static();
    let mut b = SyntaxBuilder::new("M()");
    let call = b.call(None, "M", Vec::new(), CallResolution::resolved(sig), b.span("M()"));
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null, IsInvalid) (Syntax: 'M()')
  Invocation (void P.M(string s = null, S d = default, S n = new(), int bad = "x")) (Type: null, IsInvalid) (Syntax: 'M()')
    Instance Receiver: null
    Arguments(4):
      [0] Argument (DefaultValue, Parameter: s) (Type: null, IsImplicit) (Syntax: 'M()')
        Literal (Type: string, Constant: null, IsImplicit) (Syntax: 'M()')
      [1] Argument (DefaultValue, Parameter: d) (Type: null, IsImplicit) (Syntax: 'M()')
        DefaultValue (Type: S, IsImplicit) (Syntax: 'M()')
      [2] Argument (DefaultValue, Parameter: n) (Type: null, IsImplicit) (Syntax: 'M()')
        ObjectCreation (Constructor: S..ctor()) (Type: S, IsImplicit) (Syntax: 'M()')
          Arguments(0)
      [3] Argument (DefaultValue, Parameter: bad) (Type: null, IsInvalid, IsImplicit) (Syntax: 'M()')
        Literal (Type: int, Constant: "x", IsInvalid, IsImplicit) (Syntax: 'M()')
"#,
    );
    let codes: Vec<_> = result.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec!["OPS_DEFAULT_VALUE"]);
}

#[test]
fn generic_default_is_not_invalid() {
    let sig = Signature::method(p(), "M", Type::Void)
        .optional("value", Type::TypeParam("T".into()), ParamDefault::DefaultOf)
        .into_static();
    let mut b = SyntaxBuilder::new("M()");
    let call = b.call(None, "M", Vec::new(), CallResolution::resolved(sig), b.span("M()"));
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    assert!(!result.has_errors());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn object_creation_binds_constructor_arguments() {
    let ctor = Signature::constructor(p()).param("x", Type::int());
    let mut b = SyntaxBuilder::new("new P(1)");
    let one = b.int(1, b.span("1"));
    let args = vec![b.arg(one)];
    let creation = b.expr(
        ExprKind::ObjectCreation {
            ty: p(),
            args,
            resolution: CallResolution::resolved(ctor),
        },
        b.span("new P(1)"),
    );
    let root = b.expr_stmt(creation);

    assert_dump(
        &lower(&b.finish(root)),
        r#"
ExpressionStatement (Type: null) (Syntax: 'new P(1)')
  ObjectCreation (Constructor: P..ctor(int x)) (Type: P) (Syntax: 'new P(1)')
    Arguments(1):
      [0] Argument (Explicit, Parameter: x) (Type: null) (Syntax: '1')
        Literal (Type: int, Constant: 1) (Syntax: '1')
"#,
    );
}

#[test]
fn static_call_through_type_name_has_no_instance() {
    let sig = Signature::method(p(), "S", Type::int())
        .param("x", Type::int())
        .into_static();
    let mut b = SyntaxBuilder::new("P.S(1)");
    let ty = b.expr(ExprKind::TypeName(p()), b.span("P"));
    let one = b.int(1, b.span("1"));
    let args = vec![b.arg(one)];
    let call = b.call(Some(ty), "S", args, CallResolution::resolved(sig), b.span("P.S(1)"));
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    assert_eq!(result.tree.operation_for_expr(ty), None);
    assert_dump(
        &result,
        r#"
ExpressionStatement (Type: null) (Syntax: 'P.S(1)')
  Invocation (int P.S(int x)) (Type: int) (Syntax: 'P.S(1)')
    Instance Receiver: null
    Arguments(1):
      [0] Argument (Explicit, Parameter: x) (Type: null) (Syntax: '1')
        Literal (Type: int, Constant: 1) (Syntax: '1')
"#,
    );
}

#[test]
fn argument_count_matches_parameter_count() {
    let sig = Signature::method(p(), "M", Type::Void)
        .param("a", Type::int())
        .optional("b", Type::int(), ParamDefault::DefaultOf)
        .params_array("rest", Type::array(Type::int()));
    let mut b = SyntaxBuilder::new("M(1, 2, 3, 4)").with_this_type(p());
    let values: Vec<_> = ["1", "2", "3", "4"]
        .iter()
        .map(|text| {
            let span = b.span(text);
            b.int(text.parse().expect("digit"), span)
        })
        .collect();
    let args = values.iter().map(|&value| b.arg(value)).collect();
    let call = b.call(None, "M", args, CallResolution::resolved(sig.clone()), b.span("M(1, 2, 3, 4)"));
    let root = b.expr_stmt(call);
    let result = lower(&b.finish(root));

    let invocation = result
        .tree
        .operation_for_expr(call)
        .expect("call lowered");
    let OperationData::Invocation { arguments, .. } = &result.tree.op(invocation).data else {
        panic!("expected invocation");
    };
    assert_eq!(arguments.len(), sig.params.len());
    let rest = result.tree.op(arguments[2]);
    let OperationData::Argument { kind, value, .. } = &rest.data else {
        panic!("expected argument");
    };
    assert_eq!(*kind, ArgumentKind::ParamArray);
    assert_eq!(result.tree.op(*value).kind(), OperationKind::ArrayCreation);
}
