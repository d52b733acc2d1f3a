//! Constant expression evaluation.
//!
//! Expressions evaluate during analysis with checked `i64` arithmetic.
//! Bounds for particular uses (array capacity, option ranges) are applied
//! by the consumer of the value, not here.

use super::symbols::{ScopeRef, Scopes};
use bitproto_ast::ast::{BinOp, ConstExpr, ConstExprKind};
use bitproto_ast::ir::{DefId, ProtoId, Schema, Value};
use bitproto_ast::{CompileError, ErrorKind};
use indexmap::IndexMap;

/// Evaluates a constant expression to a [`Value`].
pub fn eval_const_expr(
    expr: &ConstExpr,
    schema: &Schema,
    scopes: &Scopes,
    stack: &[ScopeRef],
    imports: &IndexMap<String, ProtoId>,
) -> Result<Value, CompileError> {
    match &expr.kind {
        ConstExprKind::Bool(v) => Ok(Value::Bool(*v)),
        ConstExprKind::Str(s) => Ok(Value::Str(s.clone())),
        ConstExprKind::Int(raw) => {
            let value = i64::try_from(*raw).map_err(|_| {
                CompileError::new(
                    ErrorKind::InvalidCalculation,
                    expr.span,
                    format!("integer literal {} too large", raw),
                )
            })?;
            Ok(Value::Int(value))
        }
        ConstExprKind::Reference(path) => {
            let def = scopes.lookup(stack, imports, path).ok_or_else(|| {
                CompileError::new(
                    ErrorKind::UndefinedName,
                    expr.span,
                    format!("referenced constant '{}' not defined", path),
                )
            })?;
            match def {
                DefId::Const(id) => Ok(schema.constant(id).value.clone()),
                _ => Err(CompileError::new(
                    ErrorKind::InvalidCalculation,
                    expr.span,
                    format!("'{}' is not a constant", path),
                )),
            }
        }
        ConstExprKind::Binary { op, lhs, rhs } => {
            let lhs_value = eval_int_operand(lhs, schema, scopes, stack, imports)?;
            let rhs_value = eval_int_operand(rhs, schema, scopes, stack, imports)?;
            let result = match op {
                BinOp::Add => lhs_value.checked_add(rhs_value),
                BinOp::Sub => lhs_value.checked_sub(rhs_value),
                BinOp::Mul => lhs_value.checked_mul(rhs_value),
                BinOp::Div => {
                    if rhs_value == 0 {
                        return Err(CompileError::new(
                            ErrorKind::InvalidCalculation,
                            expr.span,
                            "division by zero in constant expression",
                        ));
                    }
                    lhs_value.checked_div(rhs_value)
                }
            };
            result.map(Value::Int).ok_or_else(|| {
                CompileError::new(
                    ErrorKind::InvalidCalculation,
                    expr.span,
                    format!(
                        "constant expression overflows: {} {} {}",
                        lhs_value,
                        op.symbol(),
                        rhs_value
                    ),
                )
            })
        }
    }
}

/// Evaluates a calculation operand, requiring an integer.
fn eval_int_operand(
    expr: &ConstExpr,
    schema: &Schema,
    scopes: &Scopes,
    stack: &[ScopeRef],
    imports: &IndexMap<String, ProtoId>,
) -> Result<i64, CompileError> {
    let value = eval_const_expr(expr, schema, scopes, stack, imports)?;
    value.as_int().ok_or_else(|| {
        CompileError::new(
            ErrorKind::InvalidCalculation,
            expr.span,
            format!(
                "{} value used in a calculation, only integers are allowed",
                value.type_name()
            ),
        )
    })
}
