use crate::vars::VariableMap;
use std::fmt::Write;

/// Fixed nginx-style error line used when no template is configured.
///
/// The `referrer` clause is only present when a referrer was sent.
pub fn format_fallback(vars: &VariableMap) -> String {
    let mut out = String::with_capacity(256);
    let _ = write!(
        out,
        "\n{} [error]: open() \"{}\" failed (2: No such file or directory), client: {}, server: {}, request: \"{}\", host: \"{}\"",
        vars.datetime, vars.path, vars.client, vars.server, vars.request, vars.host,
    );
    if !vars.referrer.is_empty() {
        let _ = write!(out, ", referrer: \"{}\"", vars.referrer);
    }
    out.push('\n');
    out
}
