//! Axis expansion planning
//!
//! Expansion never mutates a sheet in place. Instead, a block forest is
//! walked into an ordered *plan*: one [`AxisInstance`] per output row (or
//! column), each pointing back at its source index and carrying the loop
//! bindings active for that instance. Materialisation into a fresh sheet is
//! a separate step, so source indices stay stable throughout planning and
//! there is no shift arithmetic to get wrong.
//!
//! Directive rows/columns themselves never appear in a plan.

use std::collections::BTreeMap;

use minijinja::value::Value;
use minijinja::Environment;
use tracing::debug;

use crate::block::{Block, BlockKind};
use crate::context::{eval_context, loop_meta};
use crate::directive::Axis;
use crate::error::{Error, Result};

/// One output line (row or column) of an expansion plan.
#[derive(Debug, Clone)]
pub struct AxisInstance {
    /// Index of the source line in the pre-expansion sheet
    pub src: u32,
    /// Loop variable bindings active for this instance, outermost first
    pub bindings: Vec<(String, Value)>,
    /// Metadata of the innermost enclosing loop on this axis, if any
    pub meta: Option<Value>,
}

/// Expand one axis of a sheet into an ordered plan.
///
/// `extent` is the last used index on the axis (inclusive); `blocks` is the
/// forest built from that axis's directives. Lines outside any block map
/// through unchanged, loop bodies are repeated once per element, and bodies
/// of false conditionals are dropped. An empty iterable is not an error.
pub fn expand_axis(
    env: &Environment<'static>,
    axis: Axis,
    blocks: &[Block],
    extent: u32,
    base: &BTreeMap<String, Value>,
) -> Result<Vec<AxisInstance>> {
    let planner = Planner { env, axis, base };
    let mut plan = Vec::new();
    let mut bindings = Vec::new();
    planner.walk(0, extent + 1, blocks, &mut bindings, None, &mut plan)?;
    debug!(axis = %axis, lines = extent + 1, instances = plan.len(), "axis expanded");
    Ok(plan)
}

struct Planner<'a> {
    env: &'a Environment<'static>,
    axis: Axis,
    base: &'a BTreeMap<String, Value>,
}

impl Planner<'_> {
    /// Walk the half-open index range `[start, end)` with its block forest,
    /// appending instances to `out`.
    fn walk(
        &self,
        start: u32,
        end: u32,
        blocks: &[Block],
        bindings: &mut Vec<(String, Value)>,
        meta: Option<&Value>,
        out: &mut Vec<AxisInstance>,
    ) -> Result<()> {
        let mut cursor = start;
        for block in blocks {
            for index in cursor..block.open {
                out.push(self.instance(index, bindings, meta));
            }
            match &block.kind {
                BlockKind::Loop { var, iterable } => {
                    let value = self.eval(iterable, block.open, bindings, meta)?;
                    let items: Vec<Value> = value
                        .try_iter()
                        .map_err(|source| Error::NotIterable {
                            axis: self.axis,
                            index: block.open,
                            expr: iterable.clone(),
                            source,
                        })?
                        .collect();
                    let length = items.len();
                    for (i, item) in items.into_iter().enumerate() {
                        let item_meta = loop_meta(i, length);
                        bindings.push((var.clone(), item));
                        self.walk(
                            block.open + 1,
                            block.close,
                            &block.children,
                            bindings,
                            Some(&item_meta),
                            out,
                        )?;
                        bindings.pop();
                    }
                }
                BlockKind::Cond { condition } => {
                    let value = self.eval(condition, block.open, bindings, meta)?;
                    if value.is_true() {
                        self.walk(
                            block.open + 1,
                            block.close,
                            &block.children,
                            bindings,
                            meta,
                            out,
                        )?;
                    }
                }
            }
            cursor = block.close + 1;
        }
        for index in cursor..end {
            out.push(self.instance(index, bindings, meta));
        }
        Ok(())
    }

    fn instance(
        &self,
        src: u32,
        bindings: &[(String, Value)],
        meta: Option<&Value>,
    ) -> AxisInstance {
        AxisInstance {
            src,
            bindings: bindings.to_vec(),
            meta: meta.cloned(),
        }
    }

    fn eval(
        &self,
        expr: &str,
        index: u32,
        bindings: &[(String, Value)],
        meta: Option<&Value>,
    ) -> Result<Value> {
        let ctx = eval_context(self.base, bindings, meta, self.axis);
        let compiled =
            self.env
                .compile_expression(expr)
                .map_err(|source| Error::EvalDirective {
                    axis: self.axis,
                    index,
                    expr: expr.to_string(),
                    source,
                })?;
        compiled.eval(ctx).map_err(|source| Error::EvalDirective {
            axis: self.axis,
            index,
            expr: expr.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::template_env;
    use pretty_assertions::assert_eq;

    fn base(json: serde_json::Value) -> BTreeMap<String, Value> {
        crate::context::value_to_map(&Value::from_serialize(&json))
    }

    fn loop_block(open: u32, close: u32, var: &str, iterable: &str) -> Block {
        Block {
            kind: BlockKind::Loop {
                var: var.into(),
                iterable: iterable.into(),
            },
            open,
            close,
            children: Vec::new(),
        }
    }

    fn cond_block(open: u32, close: u32, condition: &str) -> Block {
        Block {
            kind: BlockKind::Cond {
                condition: condition.into(),
            },
            open,
            close,
            children: Vec::new(),
        }
    }

    fn srcs(plan: &[AxisInstance]) -> Vec<u32> {
        plan.iter().map(|i| i.src).collect()
    }

    #[test]
    fn test_no_blocks_identity() {
        let env = template_env();
        let plan = expand_axis(&env, Axis::Row, &[], 3, &BTreeMap::new()).unwrap();
        assert_eq!(srcs(&plan), vec![0, 1, 2, 3]);
        assert!(plan.iter().all(|i| i.bindings.is_empty() && i.meta.is_none()));
    }

    #[test]
    fn test_loop_repeats_body() {
        let env = template_env();
        let data = base(serde_json::json!({ "xs": [10, 20, 30] }));
        // row 0 header, rows 1..=3 are {% for %} / body / {% endfor %}, row 4 footer
        let blocks = vec![loop_block(1, 3, "x", "xs")];
        let plan = expand_axis(&env, Axis::Row, &blocks, 4, &data).unwrap();
        assert_eq!(srcs(&plan), vec![0, 2, 2, 2, 4]);

        let second = &plan[2];
        assert_eq!(second.bindings.len(), 1);
        assert_eq!(second.bindings[0].0, "x");
        assert_eq!(second.bindings[0].1.as_i64(), Some(20));
        let meta = second.meta.as_ref().unwrap();
        assert_eq!(meta.get_attr("index").unwrap().as_i64(), Some(2));
        assert!(!meta.get_attr("last").unwrap().is_true());
    }

    #[test]
    fn test_empty_iterable_collapses_body() {
        let env = template_env();
        let data = base(serde_json::json!({ "xs": [] }));
        let blocks = vec![loop_block(0, 2, "x", "xs")];
        let plan = expand_axis(&env, Axis::Row, &blocks, 3, &data).unwrap();
        assert_eq!(srcs(&plan), vec![3]);
    }

    #[test]
    fn test_conditional_keeps_or_drops() {
        let env = template_env();
        let data = base(serde_json::json!({ "show": false }));
        let blocks = vec![cond_block(1, 3, "show")];
        let plan = expand_axis(&env, Axis::Row, &blocks, 4, &data).unwrap();
        assert_eq!(srcs(&plan), vec![0, 4]);

        let data = base(serde_json::json!({ "show": true }));
        let plan = expand_axis(&env, Axis::Row, &blocks, 4, &data).unwrap();
        assert_eq!(srcs(&plan), vec![0, 2, 4]);
    }

    #[test]
    fn test_nested_loops() {
        let env = template_env();
        let data = base(serde_json::json!({
            "groups": [ { "xs": [1, 2] }, { "xs": [3] } ]
        }));
        let mut outer = loop_block(0, 4, "g", "groups");
        outer.children.push(loop_block(1, 3, "x", "g.xs"));
        let plan = expand_axis(&env, Axis::Row, &[outer], 4, &data).unwrap();
        assert_eq!(srcs(&plan), vec![2, 2, 2]);
        assert_eq!(plan[0].bindings.len(), 2);
        assert_eq!(plan[2].bindings[1].1.as_i64(), Some(3));
        // inner loop meta wins
        let meta = plan[2].meta.as_ref().unwrap();
        assert_eq!(meta.get_attr("length").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn test_not_iterable() {
        let env = template_env();
        let data = base(serde_json::json!({ "xs": 42 }));
        let blocks = vec![loop_block(0, 2, "x", "xs")];
        let err = expand_axis(&env, Axis::Row, &blocks, 2, &data).unwrap_err();
        assert!(matches!(err, Error::NotIterable { .. }));
        assert!(err.is_structural());
    }

    #[test]
    fn test_undefined_iterable_is_eval_error() {
        let env = template_env();
        let blocks = vec![loop_block(0, 2, "x", "nope")];
        let err = expand_axis(&env, Axis::Row, &blocks, 2, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::EvalDirective { .. }));
        assert!(!err.is_structural());
    }
}
