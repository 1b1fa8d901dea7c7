use optree_syntax::{
    Argument, Enumeration, ExprId, ExprKind, ForEachVariable, LocalId, Pattern, StmtId, StmtKind,
    SyntaxBody,
};
use optree_types::{
    ArgConversions, CallResolution, ConstValue, Conversion, Diagnostic, MemberResolution,
    ParamDefault, Parameter, ParamsForm, RefKind, ResolutionFailure, Signature, Span, Type,
};

use crate::binder::{bind_arguments, ArgumentSlot, BindError, BindOptions, CallArg};
use crate::diagnostics::{LowerConfig, LowerDiagnosticKind};
use crate::operation::{ArgumentKind, OpId, Operation, OperationData};
use crate::tree::{OperationTree, SyntaxNode, TreeBuilder};

#[derive(Debug, Clone)]
pub struct LowerResult {
    pub tree: OperationTree,
    pub diagnostics: Vec<Diagnostic>,
}

impl LowerResult {
    /// Whether any operation in the tree is invalid.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.has_errors(self.tree.root())
    }
}

/// Builds the operation tree for `body`.
///
/// Never fails: anything that cannot be bound becomes an
/// [`OperationData::Invalid`] node plus a diagnostic.
#[must_use]
pub fn lower_body(body: &SyntaxBody, config: &LowerConfig) -> LowerResult {
    lower_body_with(body, config, &mut || {})
}

#[must_use]
pub fn lower_body_with(
    body: &SyntaxBody,
    config: &LowerConfig,
    check_cancelled: &mut dyn FnMut(),
) -> LowerResult {
    let mut ctx = BodyLower {
        body,
        config: *config,
        tree: TreeBuilder::default(),
        diagnostics: Vec::new(),
        conditional: Vec::new(),
        check_cancelled,
    };
    let root = ctx.lower_stmt(body.root);
    let locals = body.locals.iter().map(|(_, local)| local.clone()).collect();
    let tree = ctx.tree.finish(root, locals, &body.source);
    tracing::debug!(
        target: "optree.lower",
        operations = tree.len(),
        diagnostics = ctx.diagnostics.len(),
        "lowered body"
    );
    LowerResult {
        tree,
        diagnostics: ctx.diagnostics,
    }
}

/// How an expression's value is used; decides which accessors it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Read,
    Write,
    ReadWrite,
}

impl Usage {
    fn reads(self) -> bool {
        self != Usage::Write
    }

    fn writes(self) -> bool {
        self != Usage::Read
    }
}

pub(crate) struct BodyLower<'a> {
    pub(crate) body: &'a SyntaxBody,
    config: LowerConfig,
    pub(crate) tree: TreeBuilder,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Tested values of the enclosing conditional accesses, innermost last.
    conditional: Vec<(Option<Type>, Span)>,
    check_cancelled: &'a mut dyn FnMut(),
}

impl BodyLower<'_> {
    fn check_cancelled(&mut self) {
        let check = &mut *self.check_cancelled;
        check();
    }

    pub(crate) fn alloc(&mut self, op: Operation) -> OpId {
        self.tree.alloc(op)
    }

    fn lower_stmt(&mut self, id: StmtId) -> OpId {
        self.check_cancelled();
        let body = self.body;
        let stmt = body.stmt(id);
        let span = stmt.span;
        let op = match &stmt.kind {
            StmtKind::Block(statements) => {
                let locals = declared_locals(body, statements);
                let statements = statements.iter().map(|&s| self.lower_stmt(s)).collect();
                Operation::new(OperationData::Block { statements, locals }, None, span)
            }
            StmtKind::Expr(expr) => {
                let operation = self.lower_expr(*expr);
                Operation::new(OperationData::ExpressionStatement { operation }, None, span)
            }
            StmtKind::LocalDecl(declarators) => {
                let declarators = declarators
                    .iter()
                    .map(|declarator| {
                        let initializer = declarator.initializer.map(|e| self.lower_expr(e));
                        self.alloc(Operation::new(
                            OperationData::VariableDeclarator {
                                local: declarator.local,
                                initializer,
                            },
                            None,
                            declarator.span,
                        ))
                    })
                    .collect();
                Operation::new(
                    OperationData::VariableDeclarationGroup { declarators },
                    None,
                    span,
                )
            }
            StmtKind::Return(value) => {
                let value = value.map(|e| self.lower_expr(e));
                Operation::new(OperationData::Return { value }, None, span)
            }
            StmtKind::Empty => Operation::new(OperationData::Empty, None, span),
            StmtKind::For {
                declaration,
                initializers,
                condition,
                incrementors,
                body: loop_body,
            } => {
                let locals = declaration
                    .map(|d| declared_locals(body, &[d]))
                    .unwrap_or_default();
                let mut before: Vec<OpId> =
                    declaration.map(|d| self.lower_stmt(d)).into_iter().collect();
                before.extend(initializers.iter().map(|&e| self.implicit_statement(e)));
                let condition = condition.map(|e| self.lower_expr(e));
                let at_loop_bottom = incrementors
                    .iter()
                    .map(|&e| self.implicit_statement(e))
                    .collect();
                let loop_body = self.lower_stmt(*loop_body);
                Operation::new(
                    OperationData::ForLoop {
                        locals,
                        before,
                        condition,
                        at_loop_bottom,
                        body: loop_body,
                    },
                    None,
                    span,
                )
            }
            StmtKind::ForEach {
                variable,
                collection,
                enumeration,
                body: loop_body,
            } => self.lower_foreach(variable, *collection, enumeration, *loop_body, span),
            StmtKind::While {
                condition,
                body: loop_body,
            } => {
                let condition = self.lower_expr(*condition);
                let loop_body = self.lower_stmt(*loop_body);
                Operation::new(
                    OperationData::WhileLoop {
                        condition,
                        body: loop_body,
                    },
                    None,
                    span,
                )
            }
        };
        let op_id = self.alloc(op);
        self.tree.record(SyntaxNode::Stmt(id), op_id);
        op_id
    }

    /// A `for` clause expression wrapped in a statement that has no syntax of
    /// its own.
    fn implicit_statement(&mut self, expr: ExprId) -> OpId {
        let operation = self.lower_expr(expr);
        let span = self.tree.op(operation).span;
        self.alloc(
            Operation::new(OperationData::ExpressionStatement { operation }, None, span)
                .implicit(),
        )
    }

    fn lower_foreach(
        &mut self,
        variable: &ForEachVariable,
        collection: ExprId,
        enumeration: &Enumeration,
        loop_body: StmtId,
        span: Span,
    ) -> Operation {
        let (locals, loop_control_variable) = match variable {
            ForEachVariable::Local(local) => (vec![*local], self.declaration_reference(*local)),
            ForEachVariable::Deconstruction(pattern) => {
                let mut locals = Vec::new();
                pattern_locals(pattern, &mut locals);
                let variable = match pattern {
                    Pattern::Local(local) => self.declaration_reference(*local),
                    Pattern::Tuple { span, .. } => {
                        let tuple = self.lower_pattern(pattern);
                        let ty = self.tree.ty(tuple).cloned();
                        self.alloc(Operation::new(
                            OperationData::DeclarationExpression { expression: tuple },
                            ty,
                            *span,
                        ))
                    }
                };
                (locals, variable)
            }
            ForEachVariable::Existing(expr) => {
                (Vec::new(), self.lower_expr_with(*expr, Usage::Write))
            }
        };

        let value = self.lower_expr(collection);
        let value_span = self.tree.op(value).span;
        let mut wrapped = Operation::new(
            OperationData::Conversion {
                conversion: enumeration.collection_conversion.clone(),
                operand: value,
            },
            Some(enumeration.collection_type.clone()),
            value_span,
        )
        .implicit();
        if !enumeration.collection_conversion.exists() {
            self.report(
                LowerDiagnosticKind::InvalidConversion,
                value_span,
                format!(
                    "collection cannot be converted to `{}`",
                    enumeration.collection_type
                ),
            );
            wrapped = wrapped.invalid();
        }
        let collection = self.alloc(wrapped);
        let body = self.lower_stmt(loop_body);

        Operation::new(
            OperationData::ForEachLoop {
                locals,
                loop_control_variable,
                collection,
                element_type: enumeration.element_type.clone(),
                element_conversion: enumeration.element_conversion.clone(),
                body,
            },
            None,
            span,
        )
    }

    fn declaration_reference(&mut self, local: LocalId) -> OpId {
        let decl = self.body.local(local);
        self.alloc(Operation::new(
            OperationData::LocalReference {
                local,
                is_declaration: true,
            },
            Some(decl.ty.clone()),
            decl.span,
        ))
    }

    fn lower_pattern(&mut self, pattern: &Pattern) -> OpId {
        match pattern {
            Pattern::Local(local) => self.declaration_reference(*local),
            Pattern::Tuple { elements, span } => {
                let elements: Vec<OpId> = elements.iter().map(|p| self.lower_pattern(p)).collect();
                let ty = self.tuple_type(&elements);
                self.alloc(Operation::new(
                    OperationData::Tuple { elements },
                    Some(ty),
                    *span,
                ))
            }
        }
    }

    fn tuple_type(&self, elements: &[OpId]) -> Type {
        Type::Tuple(
            elements
                .iter()
                .map(|&e| self.tree.ty(e).cloned().unwrap_or(Type::Error))
                .collect(),
        )
    }

    pub(crate) fn lower_expr(&mut self, id: ExprId) -> OpId {
        self.lower_expr_with(id, Usage::Read)
    }

    fn lower_expr_with(&mut self, id: ExprId, usage: Usage) -> OpId {
        let op = self.expr_operation(id, usage);
        let op_id = self.alloc(op);
        self.tree.record(SyntaxNode::Expr(id), op_id);
        op_id
    }

    fn expr_operation(&mut self, id: ExprId, usage: Usage) -> Operation {
        let body = self.body;
        let expr = body.expr(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal { value, ty } => {
                Operation::new(OperationData::Literal, ty.clone(), span).with_constant(value.clone())
            }
            ExprKind::Local(local) => Operation::new(
                OperationData::LocalReference {
                    local: *local,
                    is_declaration: false,
                },
                Some(body.local(*local).ty.clone()),
                span,
            ),
            ExprKind::Parameter { name, ty } => Operation::new(
                OperationData::ParameterReference { name: name.clone() },
                Some(ty.clone()),
                span,
            ),
            ExprKind::This => {
                let ty = self.this_type(span);
                Operation::new(OperationData::InstanceReference, Some(ty), span)
            }
            ExprKind::TypeName(ty) => self.invalid(
                LowerDiagnosticKind::InvalidReceiver,
                format!("type `{ty}` used as a value"),
                Vec::new(),
                Some(ty.clone()),
                span,
            ),
            ExprKind::Name(name) => self.invalid(
                LowerDiagnosticKind::UnresolvedName,
                format!("cannot resolve name `{name}`"),
                Vec::new(),
                Some(Type::Error),
                span,
            ),
            ExprKind::Missing => self.invalid(
                LowerDiagnosticKind::MissingSyntax,
                "expected an expression".to_string(),
                Vec::new(),
                Some(Type::Error),
                span,
            ),
            ExprKind::MemberAccess {
                receiver,
                name,
                member,
            } => self.lower_member_access(*receiver, name, member, usage, span),
            ExprKind::Invocation {
                receiver,
                name,
                args,
                resolution,
            } => self.lower_invocation(*receiver, name, args, resolution, span),
            ExprKind::ElementAccess {
                receiver,
                args,
                resolution,
            } => self.lower_element_access(*receiver, args, resolution, usage, span),
            ExprKind::ObjectCreation {
                ty,
                args,
                resolution,
            } => self.lower_object_creation(ty, args, resolution, span),
            ExprKind::ArrayCreation { element, elements } => {
                let elements: Vec<OpId> = elements.iter().map(|&e| self.lower_expr(e)).collect();
                let size = self.int_literal(elements.len(), span);
                let initializer = self.alloc(Operation::new(
                    OperationData::ArrayInitializer { elements },
                    None,
                    span,
                ));
                Operation::new(
                    OperationData::ArrayCreation {
                        dimension_sizes: vec![size],
                        initializer: Some(initializer),
                    },
                    Some(Type::array(element.clone())),
                    span,
                )
            }
            ExprKind::ConditionalAccess {
                receiver,
                when_not_null,
            } => {
                let operation = self.lower_expr(*receiver);
                let tested = self.tree.op(operation);
                let tested_ty = tested.ty.as_ref().map(|ty| ty.underlying().clone());
                let tested_span = tested.span;
                self.conditional.push((tested_ty, tested_span));
                let when_not_null = self.lower_expr_with(*when_not_null, usage);
                self.conditional.pop();
                let ty = self.tree.ty(when_not_null).cloned().map(Type::lifted);
                Operation::new(
                    OperationData::ConditionalAccess {
                        operation,
                        when_not_null,
                    },
                    ty,
                    span,
                )
            }
            ExprKind::ConditionalReceiver => match self.conditional.last().cloned() {
                Some((ty, tested_span)) => {
                    Operation::new(OperationData::ConditionalAccessInstance, ty, tested_span)
                        .implicit()
                }
                None => self.invalid(
                    LowerDiagnosticKind::InvalidReceiver,
                    "conditional receiver outside of a conditional access".to_string(),
                    Vec::new(),
                    Some(Type::Error),
                    span,
                ),
            },
            ExprKind::Assignment { target, value, op } => match op {
                None => {
                    let target = self.lower_expr_with(*target, Usage::Write);
                    let value = self.lower_expr(*value);
                    let ty = self.tree.ty(target).cloned();
                    Operation::new(OperationData::SimpleAssignment { target, value }, ty, span)
                }
                Some(op) => {
                    let target = self.lower_expr_with(*target, Usage::ReadWrite);
                    let value = self.lower_expr(*value);
                    let ty = self.tree.ty(target).cloned();
                    Operation::new(
                        OperationData::CompoundAssignment {
                            op: *op,
                            target,
                            value,
                        },
                        ty,
                        span,
                    )
                }
            },
            ExprKind::Binary { op, lhs, rhs, ty } => {
                let lhs = self.lower_expr(*lhs);
                let rhs = self.lower_expr(*rhs);
                Operation::new(
                    OperationData::Binary { op: *op, lhs, rhs },
                    Some(ty.clone()),
                    span,
                )
            }
            ExprKind::Increment {
                target,
                is_decrement,
                is_postfix,
            } => {
                let target = self.lower_expr_with(*target, Usage::ReadWrite);
                let ty = self.tree.ty(target).cloned();
                Operation::new(
                    OperationData::Increment {
                        target,
                        is_decrement: *is_decrement,
                        is_postfix: *is_postfix,
                    },
                    ty,
                    span,
                )
            }
            ExprKind::Cast {
                ty,
                operand,
                conversion,
            } => {
                let operand = self.lower_expr(*operand);
                let op = Operation::new(
                    OperationData::Conversion {
                        conversion: conversion.clone(),
                        operand,
                    },
                    Some(ty.clone()),
                    span,
                );
                if conversion.exists() {
                    op
                } else {
                    self.report(
                        LowerDiagnosticKind::InvalidConversion,
                        span,
                        format!("no conversion to `{ty}`"),
                    );
                    op.invalid()
                }
            }
            ExprKind::Tuple(elements) => {
                let elements: Vec<OpId> = elements.iter().map(|&e| self.lower_expr(e)).collect();
                let ty = self.tuple_type(&elements);
                Operation::new(OperationData::Tuple { elements }, Some(ty), span)
            }
        }
    }

    fn this_type(&mut self, span: Span) -> Type {
        match &self.body.this_type {
            Some(ty) => ty.clone(),
            None => {
                self.report(
                    LowerDiagnosticKind::InvalidReceiver,
                    span,
                    "`this` is not available in a static context".to_string(),
                );
                Type::Error
            }
        }
    }

    fn implicit_this(&mut self, span: Span) -> OpId {
        let ty = self.this_type(span);
        self.alloc(Operation::new(OperationData::InstanceReference, Some(ty), span).implicit())
    }

    fn int_literal(&mut self, value: usize, span: Span) -> OpId {
        self.alloc(
            Operation::new(OperationData::Literal, Some(Type::int()), span)
                .with_constant(ConstValue::Int(value as i64))
                .implicit(),
        )
    }

    fn is_type_name(&self, expr: ExprId) -> bool {
        matches!(self.body.expr(expr).kind, ExprKind::TypeName(_))
    }

    /// Lowers a member receiver. Type names are not values and produce
    /// nothing; the flag reports whether one was present.
    fn lower_receiver(&mut self, receiver: Option<ExprId>) -> (Option<OpId>, bool) {
        match receiver {
            Some(expr) if self.is_type_name(expr) => (None, true),
            Some(expr) => (Some(self.lower_expr(expr)), false),
            None => (None, false),
        }
    }

    /// The instance of a non-static member: the explicit receiver, or an
    /// implicit `this`.
    fn instance_for(&mut self, is_static: bool, explicit: Option<OpId>, span: Span) -> Option<OpId> {
        if is_static {
            return None;
        }
        match explicit {
            Some(instance) => Some(instance),
            None => Some(self.implicit_this(span)),
        }
    }

    fn lower_argument_values(&mut self, args: &[Argument]) -> Vec<OpId> {
        args.iter()
            .map(|arg| {
                let usage = match arg.ref_kind {
                    RefKind::Out => Usage::Write,
                    RefKind::Ref => Usage::ReadWrite,
                    RefKind::None | RefKind::In => Usage::Read,
                };
                self.lower_expr_with(arg.value, usage)
            })
            .collect()
    }

    fn lower_member_access(
        &mut self,
        receiver: Option<ExprId>,
        name: &str,
        member: &MemberResolution,
        usage: Usage,
        span: Span,
    ) -> Operation {
        let (explicit, type_receiver) = self.lower_receiver(receiver);
        match member {
            MemberResolution::Unresolved(failure) => self.invalid_call(
                LowerDiagnosticKind::UnresolvedMember,
                format!("cannot resolve member `{name}`: {}", failure.reason),
                explicit,
                &[],
                None,
                failure_type(failure),
                span,
            ),
            MemberResolution::Field(field) => {
                let ty = Some(field.ty.clone());
                if let Some(message) = receiver_error(field.is_static, explicit, type_receiver) {
                    return self.invalid(
                        LowerDiagnosticKind::InvalidReceiver,
                        format!("`{name}`: {message}"),
                        explicit.into_iter().collect(),
                        ty,
                        span,
                    );
                }
                let instance = self.instance_for(field.is_static, explicit, span);
                Operation::new(
                    OperationData::FieldReference {
                        field: field.clone(),
                        instance,
                    },
                    ty,
                    span,
                )
            }
            MemberResolution::Property(signature) => {
                let ty = signature.result_type();
                if let Some(message) = receiver_error(signature.is_static, explicit, type_receiver)
                {
                    return self.invalid(
                        LowerDiagnosticKind::InvalidReceiver,
                        format!("`{name}`: {message}"),
                        explicit.into_iter().collect(),
                        ty,
                        span,
                    );
                }
                let instance = self.instance_for(signature.is_static, explicit, span);
                if let Some(message) = accessor_error(signature, usage) {
                    return self.invalid(
                        LowerDiagnosticKind::AccessorMismatch,
                        message,
                        instance.into_iter().collect(),
                        ty,
                        span,
                    );
                }
                Operation::new(
                    OperationData::PropertyReference {
                        signature: signature.clone(),
                        instance,
                        arguments: Vec::new(),
                    },
                    ty,
                    span,
                )
            }
        }
    }

    fn lower_invocation(
        &mut self,
        receiver: Option<ExprId>,
        name: &str,
        args: &[Argument],
        resolution: &CallResolution,
        span: Span,
    ) -> Operation {
        tracing::trace!(target: "optree.lower", member = name, args = args.len(), "lowering call");
        let (explicit, type_receiver) = self.lower_receiver(receiver);
        let values = self.lower_argument_values(args);
        let (signature, conversions, params_form) = match resolution {
            CallResolution::Resolved {
                signature,
                conversions,
                params_form,
            } => (signature, conversions, *params_form),
            CallResolution::Unresolved(failure) => {
                return self.invalid_call(
                    LowerDiagnosticKind::UnresolvedMember,
                    format!("cannot resolve `{name}`: {}", failure.reason),
                    explicit,
                    &values,
                    None,
                    failure_type(failure),
                    span,
                )
            }
        };
        let ty = signature.result_type();

        let receiver_is_argument = signature.is_extension && explicit.is_some();
        if !receiver_is_argument {
            if let Some(message) = receiver_error(signature.is_static, explicit, type_receiver) {
                return self.invalid_call(
                    LowerDiagnosticKind::InvalidReceiver,
                    format!("`{name}`: {message}"),
                    explicit,
                    &values,
                    None,
                    ty,
                    span,
                );
            }
        }

        let bound = self.bind(
            signature,
            args,
            &values,
            conversions,
            receiver_is_argument,
            params_form,
        );
        match bound {
            Ok(slots) => {
                let (instance, receiver_argument) = if receiver_is_argument {
                    (None, explicit)
                } else {
                    (self.instance_for(signature.is_static, explicit, span), None)
                };
                let arguments = self.build_arguments(
                    signature,
                    &slots,
                    args,
                    &values,
                    conversions,
                    receiver_argument,
                    span,
                );
                Operation::new(
                    OperationData::Invocation {
                        signature: signature.clone(),
                        instance,
                        arguments,
                    },
                    ty,
                    span,
                )
            }
            Err(err) => self.binding_failure(&err, signature, explicit, &values, ty, span),
        }
    }

    fn lower_element_access(
        &mut self,
        receiver: ExprId,
        args: &[Argument],
        resolution: &CallResolution,
        usage: Usage,
        span: Span,
    ) -> Operation {
        let instance = self.lower_expr(receiver);
        let values = self.lower_argument_values(args);
        let (signature, conversions, params_form) = match resolution {
            CallResolution::Resolved {
                signature,
                conversions,
                params_form,
            } => (signature, conversions, *params_form),
            CallResolution::Unresolved(failure) => {
                return self.invalid_call(
                    LowerDiagnosticKind::UnresolvedMember,
                    format!("cannot resolve indexer: {}", failure.reason),
                    Some(instance),
                    &values,
                    None,
                    failure_type(failure),
                    span,
                )
            }
        };
        let ty = signature.result_type();

        // The raw receiver and argument values survive, without conversions.
        if let Some(message) = accessor_error(signature, usage) {
            return self.invalid_call(
                LowerDiagnosticKind::AccessorMismatch,
                message,
                Some(instance),
                &values,
                None,
                ty,
                span,
            );
        }

        match self.bind(signature, args, &values, conversions, false, params_form) {
            Ok(slots) => {
                let arguments = self.build_arguments(
                    signature,
                    &slots,
                    args,
                    &values,
                    conversions,
                    None,
                    span,
                );
                Operation::new(
                    OperationData::PropertyReference {
                        signature: signature.clone(),
                        instance: Some(instance),
                        arguments,
                    },
                    ty,
                    span,
                )
            }
            Err(err) => self.binding_failure(&err, signature, Some(instance), &values, ty, span),
        }
    }

    fn lower_object_creation(
        &mut self,
        created: &Type,
        args: &[Argument],
        resolution: &CallResolution,
        span: Span,
    ) -> Operation {
        let values = self.lower_argument_values(args);
        let ty = Some(created.clone());
        let (signature, conversions, params_form) = match resolution {
            CallResolution::Resolved {
                signature,
                conversions,
                params_form,
            } => (signature, conversions, *params_form),
            CallResolution::Unresolved(failure) => {
                return self.invalid_call(
                    LowerDiagnosticKind::UnresolvedMember,
                    format!("cannot resolve constructor of `{created}`: {}", failure.reason),
                    None,
                    &values,
                    None,
                    ty,
                    span,
                )
            }
        };

        match self.bind(signature, args, &values, conversions, false, params_form) {
            Ok(slots) => {
                let arguments = self.build_arguments(
                    signature,
                    &slots,
                    args,
                    &values,
                    conversions,
                    None,
                    span,
                );
                Operation::new(
                    OperationData::ObjectCreation {
                        constructor: signature.clone(),
                        arguments,
                    },
                    ty,
                    span,
                )
            }
            Err(err) => self.binding_failure(&err, signature, None, &values, ty, span),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bind(
        &self,
        signature: &Signature,
        args: &[Argument],
        values: &[OpId],
        conversions: &[ArgConversions],
        receiver_is_argument: bool,
        params_form: Option<ParamsForm>,
    ) -> Result<Vec<ArgumentSlot>, BindError> {
        let call_args: Vec<CallArg<'_>> = args
            .iter()
            .zip(values)
            .enumerate()
            .map(|(idx, (arg, &value))| CallArg {
                name: arg.name.as_deref(),
                ref_kind: arg.ref_kind,
                ty: self.tree.ty(value),
                is_missing: matches!(self.body.expr(arg.value).kind, ExprKind::Missing),
                converts: conversions.get(idx).map_or(true, |c| c.input.exists()),
            })
            .collect();
        let mut options =
            BindOptions::new(self.config.argument_order).with_params_form(params_form);
        options.receiver_is_argument = receiver_is_argument;
        bind_arguments(signature, &call_args, options)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_arguments(
        &mut self,
        signature: &Signature,
        slots: &[ArgumentSlot],
        args: &[Argument],
        values: &[OpId],
        conversions: &[ArgConversions],
        receiver: Option<OpId>,
        call_span: Span,
    ) -> Vec<OpId> {
        let conversions_of = |arg: usize| conversions.get(arg).cloned().unwrap_or_default();
        let mut arguments = Vec::with_capacity(slots.len());
        for slot in slots {
            let argument = match slot {
                ArgumentSlot::Receiver { param } => {
                    let Some(value) = receiver else { continue };
                    let span = self.tree.op(value).span;
                    let op = argument_operation(
                        ArgumentKind::Explicit,
                        Some(&signature.params[*param]),
                        value,
                        ArgConversions::default(),
                        span,
                    );
                    op.implicit()
                }
                ArgumentSlot::Explicit { arg, param } => argument_operation(
                    ArgumentKind::Explicit,
                    Some(&signature.params[*param]),
                    values[*arg],
                    conversions_of(*arg),
                    args[*arg].span,
                ),
                ArgumentSlot::DefaultValue { param } => {
                    let parameter = &signature.params[*param];
                    let value = self.default_value(parameter, call_span);
                    argument_operation(
                        ArgumentKind::DefaultValue,
                        Some(parameter),
                        value,
                        ArgConversions::default(),
                        call_span,
                    )
                    .implicit()
                }
                ArgumentSlot::ParamArray { param, elements } => {
                    let parameter = &signature.params[*param];
                    let span = elements
                        .iter()
                        .map(|&arg| args[arg].span)
                        .reduce(Span::cover)
                        .unwrap_or(call_span);
                    let items = elements
                        .iter()
                        .map(|&arg| {
                            let target = parameter.ty.element_type().cloned().unwrap_or(Type::Error);
                            self.convert_implicitly(values[arg], conversions_of(arg).input, target)
                        })
                        .collect();
                    let value = self.params_array(parameter, items, span);
                    argument_operation(
                        ArgumentKind::ParamArray,
                        Some(parameter),
                        value,
                        ArgConversions::default(),
                        span,
                    )
                    .implicit()
                }
                ArgumentSlot::Vararg { arg } => argument_operation(
                    ArgumentKind::Explicit,
                    None,
                    values[*arg],
                    conversions_of(*arg),
                    args[*arg].span,
                ),
                ArgumentSlot::ArgListSentinel => {
                    let sentinel = self.alloc(
                        Operation::new(OperationData::ArgList, None, call_span).implicit(),
                    );
                    argument_operation(
                        ArgumentKind::Explicit,
                        None,
                        sentinel,
                        ArgConversions::default(),
                        call_span,
                    )
                    .implicit()
                }
            };
            arguments.push(self.alloc(argument));
        }
        arguments
    }

    fn convert_implicitly(&mut self, value: OpId, conversion: Conversion, target: Type) -> OpId {
        if conversion.is_identity() {
            return value;
        }
        let span = self.tree.op(value).span;
        let exists = conversion.exists();
        let op = Operation::new(
            OperationData::Conversion {
                conversion,
                operand: value,
            },
            Some(target),
            span,
        )
        .implicit();
        self.alloc(if exists { op } else { op.invalid() })
    }

    fn params_array(&mut self, parameter: &Parameter, elements: Vec<OpId>, span: Span) -> OpId {
        let size = self.int_literal(elements.len(), span);
        let initializer = self.alloc(
            Operation::new(OperationData::ArrayInitializer { elements }, None, span).implicit(),
        );
        self.alloc(
            Operation::new(
                OperationData::ArrayCreation {
                    dimension_sizes: vec![size],
                    initializer: Some(initializer),
                },
                Some(parameter.ty.clone()),
                span,
            )
            .implicit(),
        )
    }

    /// The value synthesized for an omitted optional parameter.
    fn default_value(&mut self, parameter: &Parameter, span: Span) -> OpId {
        let ty = Some(parameter.ty.clone());
        let op = match &parameter.default {
            Some(ParamDefault::Constant(value)) => {
                Operation::new(OperationData::Literal, ty, span).with_constant(value.clone())
            }
            Some(ParamDefault::DefaultOf) => Operation::new(OperationData::DefaultValue, ty, span),
            Some(ParamDefault::New) => Operation::new(
                OperationData::ObjectCreation {
                    constructor: Signature::constructor(parameter.ty.clone()),
                    arguments: Vec::new(),
                },
                ty,
                span,
            ),
            Some(ParamDefault::Unconvertible(value)) => {
                self.report(
                    LowerDiagnosticKind::InvalidDefaultValue,
                    span,
                    format!(
                        "default value of parameter `{}` cannot be converted to `{}`",
                        parameter.name, parameter.ty
                    ),
                );
                match value {
                    Some(value) => Operation::new(OperationData::Literal, ty, span)
                        .with_constant(value.clone())
                        .invalid(),
                    None => Operation::new(
                        OperationData::Invalid {
                            children: Vec::new(),
                        },
                        ty,
                        span,
                    )
                    .invalid(),
                }
            }
            None => {
                self.report(
                    LowerDiagnosticKind::InvalidDefaultValue,
                    span,
                    format!("parameter `{}` has no default value", parameter.name),
                );
                Operation::new(
                    OperationData::Invalid {
                        children: Vec::new(),
                    },
                    ty,
                    span,
                )
                .invalid()
            }
        };
        self.alloc(op.implicit())
    }
}

fn argument_operation(
    kind: ArgumentKind,
    parameter: Option<&Parameter>,
    value: OpId,
    conversions: ArgConversions,
    span: Span,
) -> Operation {
    Operation::new(
        OperationData::Argument {
            kind,
            parameter: parameter.cloned(),
            value,
            in_conversion: conversions.input,
            out_conversion: conversions.output,
        },
        None,
        span,
    )
}

/// Why a member with the given staticness cannot be reached through the
/// receiver as written.
fn receiver_error(
    is_static: bool,
    explicit: Option<OpId>,
    type_receiver: bool,
) -> Option<&'static str> {
    match (is_static, explicit) {
        (true, Some(_)) => Some("static member accessed through an instance"),
        (false, None) if type_receiver => Some("instance member accessed through a type"),
        _ => None,
    }
}

fn accessor_error(signature: &Signature, usage: Usage) -> Option<String> {
    if usage.reads() && !signature.accessors.get {
        Some(format!("`{signature}` has no get accessor"))
    } else if usage.writes() && !signature.accessors.set {
        Some(format!("`{signature}` has no set accessor"))
    } else {
        None
    }
}

/// Best-effort type of a call that failed to resolve.
fn failure_type(failure: &ResolutionFailure) -> Option<Type> {
    match &failure.candidate {
        Some(candidate) => candidate.result_type(),
        None => Some(Type::Error),
    }
}

/// Locals declared directly by `statements`.
fn declared_locals(body: &SyntaxBody, statements: &[StmtId]) -> Vec<LocalId> {
    statements
        .iter()
        .filter_map(|&s| match &body.stmt(s).kind {
            StmtKind::LocalDecl(declarators) => Some(declarators.iter().map(|d| d.local)),
            _ => None,
        })
        .flatten()
        .collect()
}

fn pattern_locals(pattern: &Pattern, out: &mut Vec<LocalId>) {
    match pattern {
        Pattern::Local(local) => out.push(*local),
        Pattern::Tuple { elements, .. } => {
            for element in elements {
                pattern_locals(element, out);
            }
        }
    }
}
