//! Proxy functions.
//!
//! The dispatcher calls every registered function as `(Context, anydata)`.
//! A proxy has exactly that shape and forwards both arguments unchanged to
//! the handler, returning the handler's result.

use crate::core::DispatcherConfig;
use crate::program::{Function, Param, Program, Symbol, TypeDesc};

use super::{block, function, invocation, param_ref, return_stmt};

/// Build the proxy for a validated handler.
///
/// The handler must have two parameters; the validator guarantees it.
pub fn synthesize_proxy(program: &Program, handler: &Function, config: &DispatcherConfig) -> Function {
    let params = vec![
        Param::new(handler.params[0].name.clone(), handler.params[0].ty.clone()),
        Param::new(handler.params[1].name.clone(), TypeDesc::Anydata),
    ];
    let mut proxy = function(
        config.proxy_name(&handler.name),
        handler.location.clone(),
        params,
        handler.return_type.clone(),
    );

    let args = (0..2).filter_map(|i| param_ref(&proxy, i)).collect();
    let target = Symbol::new(program.package.clone(), handler.name.clone());
    let call = invocation(None, target, args, handler.declared_return());
    proxy.body = block([return_stmt(call)]);

    log::debug!("synthesized proxy {} for {}", proxy.name, handler.name);
    proxy
}
