//! Terraform configuration templating.
//!
//! Templates are compiled into the binary and rendered with minijinja. The
//! `hcl` filter quotes any value as an HCL literal (strings, lists and maps
//! use JSON syntax, which HCL accepts).

use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior, Value};
use serde::Serialize;

use crate::error::{LokoError, Result};

fn hcl(value: Value) -> std::result::Result<String, Error> {
    serde_json::to_string(&value)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_filter("hcl", hcl);
    env
}

/// Render `source` with `ctx`. `name` identifies the template in errors.
pub fn render<S: Serialize>(name: &'static str, source: &'static str, ctx: S) -> Result<String> {
    let mut env = environment();
    env.add_template(name, source)
        .map_err(|e| LokoError::render(name, e))?;
    env.get_template(name)
        .and_then(|t| t.render(ctx))
        .map_err(|e| LokoError::render(name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_hcl_filter_quotes_strings_and_lists() {
        let out = render(
            "t.tf",
            "a = {{ name|hcl }}\nb = {{ items|hcl }}\n",
            context! { name => "x\"y", items => vec!["a:1", "b:2"] },
        )
        .unwrap();
        assert_eq!(out, "a = \"x\\\"y\"\nb = [\"a:1\",\"b:2\"]\n");
    }

    #[test]
    fn test_block_tags_leave_no_blank_lines() {
        let out = render(
            "t.tf",
            "start\n  {% if flag %}\n  on\n  {% endif %}\nend\n",
            context! { flag => true },
        )
        .unwrap();
        assert_eq!(out, "start\n  on\nend\n");
    }

    #[test]
    fn test_undefined_variable_is_an_error() {
        let err = render("t.tf", "{{ missing }}", context! {}).unwrap_err();
        assert!(matches!(err, LokoError::Render { .. }));
    }
}
