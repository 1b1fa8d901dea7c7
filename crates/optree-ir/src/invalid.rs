//! Degrading constructs that failed to bind into `Invalid` operations.
//!
//! An invalid operation keeps every sub-expression that did bind, so
//! analyzers still see the receiver and argument values of a broken call.

use optree_types::{Conversion, Signature, Span, Type};

use crate::binder::BindError;
use crate::diagnostics::{diagnostic, LowerDiagnosticKind};
use crate::lowering::BodyLower;
use crate::operation::{OpId, Operation, OperationData};

impl BodyLower<'_> {
    pub(crate) fn report(&mut self, kind: LowerDiagnosticKind, span: Span, message: String) {
        tracing::debug!(
            target: "optree.lower",
            code = kind.code(),
            start = span.start,
            end = span.end,
            "{message}"
        );
        self.diagnostics.push(diagnostic(kind, Some(span), message));
    }

    pub(crate) fn invalid(
        &mut self,
        kind: LowerDiagnosticKind,
        message: String,
        children: Vec<OpId>,
        ty: Option<Type>,
        span: Span,
    ) -> Operation {
        self.report(kind, span, message);
        Operation::new(OperationData::Invalid { children }, ty, span).invalid()
    }

    /// A call that could not be bound: the explicit receiver (if any)
    /// followed by the argument values in call-site order.
    ///
    /// `mismatch` names an argument whose value has no conversion to the
    /// given type; it is wrapped in an invalid implicit conversion.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn invalid_call(
        &mut self,
        kind: LowerDiagnosticKind,
        message: String,
        receiver: Option<OpId>,
        values: &[OpId],
        mismatch: Option<(usize, Type)>,
        ty: Option<Type>,
        span: Span,
    ) -> Operation {
        let mut children: Vec<OpId> = receiver.into_iter().collect();
        for (idx, &value) in values.iter().enumerate() {
            let child = match &mismatch {
                Some((arg, target)) if *arg == idx => {
                    let operand_span = self.tree.op(value).span;
                    self.alloc(
                        Operation::new(
                            OperationData::Conversion {
                                conversion: Conversion::none(),
                                operand: value,
                            },
                            Some(target.clone()),
                            operand_span,
                        )
                        .implicit()
                        .invalid(),
                    )
                }
                _ => value,
            };
            children.push(child);
        }
        self.invalid(kind, message, children, ty, span)
    }

    pub(crate) fn binding_failure(
        &mut self,
        err: &BindError,
        signature: &Signature,
        receiver: Option<OpId>,
        values: &[OpId],
        ty: Option<Type>,
        span: Span,
    ) -> Operation {
        let mismatch = match err {
            BindError::ArgumentMismatch { arg, parameter } => signature
                .parameter_named(parameter)
                .map(|param| {
                    let target = if param.is_params {
                        param.ty.element_type().unwrap_or(&param.ty)
                    } else {
                        &param.ty
                    };
                    (*arg, target.clone())
                }),
            _ => None,
        };
        self.invalid_call(
            LowerDiagnosticKind::ArgumentBinding,
            format!("cannot call `{signature}`: {err}"),
            receiver,
            values,
            mismatch,
            ty,
            span,
        )
    }
}
