//! Per-compilation lowering state
//!
//! Temporaries and labels are numbered by counters that live here, one context per
//! compilation run. Names are never reused within a run, and a temporary never takes the
//! name of a parameter or local of the method being lowered.

use crate::ast::Type;
use crate::consts::TEMP_PREFIX;
use crate::error::{Error, Result};
use crate::ir::Operand;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct CompilationContext {
    next_temp: u32,
    next_label: u32,
    /// Variable names of the current method
    taken: HashSet<String>,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of names temporaries must avoid; called once per method
    pub fn reserve_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taken = names.into_iter().map(Into::into).collect();
    }

    /// `tmp0`, `tmp1`, ... skipping reserved names
    pub fn fresh_temp(&mut self) -> String {
        loop {
            let name = format!("{}{}", TEMP_PREFIX, self.next_temp);
            self.next_temp += 1;
            if !self.taken.contains(&name) {
                return name;
            }
        }
    }

    /// `prefix0`, `prefix1`, ... drawn from one counter shared by every prefix
    pub fn fresh_label(&mut self, prefix: &str) -> String {
        let label = format!("{}{}", prefix, self.next_label);
        self.next_label += 1;
        label
    }

    /// Fresh temporary operand of type `ty`
    pub fn temp(&mut self, ty: &Type) -> Result<Operand> {
        ir_type_suffix(ty)?;
        Ok(Operand::var(self.fresh_temp(), ty.clone()))
    }
}

/// IR type suffix of a value type. A vararg only exists in parameter lists, so
/// meeting one here means the tree broke its contract.
pub fn ir_type_suffix(ty: &Type) -> Result<String> {
    match ty {
        Type::Vararg => Err(Error::internal(
            "vararg type escaped its parameter list",
        )),
        other => Ok(other.suffix()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temps_are_monotonic() {
        let mut ctx = CompilationContext::new();
        assert_eq!(ctx.fresh_temp(), "tmp0");
        assert_eq!(ctx.fresh_temp(), "tmp1");
        assert_eq!(ctx.fresh_temp(), "tmp2");
    }

    #[test]
    fn test_temps_skip_reserved_names() {
        let mut ctx = CompilationContext::new();
        ctx.reserve_names(["tmp0", "tmp2", "a"]);
        assert_eq!(ctx.fresh_temp(), "tmp1");
        assert_eq!(ctx.fresh_temp(), "tmp3");

        ctx.reserve_names(Vec::<String>::new());
        assert_eq!(ctx.fresh_temp(), "tmp4");
    }

    #[test]
    fn test_labels_never_repeat_across_prefixes() {
        let mut ctx = CompilationContext::new();
        let a = ctx.fresh_label("then");
        let b = ctx.fresh_label("endif");
        let c = ctx.fresh_label("then");
        assert_eq!(a, "then0");
        assert_eq!(b, "endif1");
        assert_eq!(c, "then2");
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(ir_type_suffix(&Type::Int).unwrap(), "i32");
        assert_eq!(ir_type_suffix(&Type::Boolean).unwrap(), "bool");
        assert_eq!(ir_type_suffix(&Type::Void).unwrap(), "V");
        assert_eq!(ir_type_suffix(&Type::ArrayOfInt).unwrap(), "array.i32");
        assert_eq!(ir_type_suffix(&Type::object("Foo")).unwrap(), "Foo");
    }

    #[test]
    fn test_vararg_suffix_is_internal_error() {
        let err = ir_type_suffix(&Type::Vararg).unwrap_err();
        assert!(err.is_internal());
        let mut ctx = CompilationContext::new();
        assert!(ctx.temp(&Type::Vararg).is_err());
    }

    #[test]
    fn test_separate_contexts_start_over() {
        let mut first = CompilationContext::new();
        first.fresh_temp();
        let mut second = CompilationContext::new();
        assert_eq!(second.fresh_temp(), "tmp0");
    }
}
