//! `Arith`, the service the `httprpc` binary serves.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::codec::json::ErrorObject;
use crate::http::RequestContext;
use crate::registry::{MethodSet, Service};

/// Operands, sent as `{"A": .., "B": ..}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Args {
    pub a: i64,
    pub b: i64,
}

/// Integer quotient and remainder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Quotient {
    pub quo: i64,
    pub rem: i64,
}

/// Integer arithmetic.
#[derive(Debug, Default)]
pub struct Arith;

impl Arith {
    fn multiply(&self, _ctx: &RequestContext, args: &Args, reply: &mut i64) -> Result<(), ErrorObject> {
        *reply = args.a.checked_mul(args.b).ok_or_else(|| overflow("multiply"))?;
        Ok(())
    }

    fn divide(&self, ctx: &RequestContext, args: &Args, reply: &mut Quotient) -> Result<(), ErrorObject> {
        if args.b == 0 {
            tracing::debug!(request_id = %ctx.request_id(), "Division by zero");
            return Err(error_object(1, "divide by zero".to_string()));
        }
        reply.quo = args.a.checked_div(args.b).ok_or_else(|| overflow("divide"))?;
        reply.rem = args.a % args.b;
        Ok(())
    }
}

fn overflow(op: &str) -> ErrorObject {
    error_object(2, format!("{op} overflows"))
}

fn error_object(code: i64, message: String) -> ErrorObject {
    let mut object = Map::new();
    object.insert("code".to_string(), code.into());
    object.insert("message".to_string(), message.into());
    ErrorObject::from_object(object)
}

impl Service for Arith {
    fn methods(methods: &mut MethodSet<Self>) {
        methods
            .method("Multiply", Arith::multiply)
            .method("Divide", Arith::divide);
    }
}
