//! Block tree construction
//!
//! Pairs open/close directives into a tree of properly nested blocks. A
//! block's `open` and `close` are axis indices (rows for the row axis,
//! columns for the column axis); the body is the exclusive range between
//! them. Nesting must be proper: a close always matches the innermost open.

use crate::directive::{Axis, Directive, DirectiveKind};
use crate::error::{Error, Result};

/// What a block does to its body
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Repeat the body once per element of `iterable`, binding `var`
    Loop { var: String, iterable: String },
    /// Keep the body only if `condition` is truthy
    Cond { condition: String },
}

/// A matched open/close directive pair with its nested children
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    /// Axis index of the opening directive
    pub open: u32,
    /// Axis index of the closing directive
    pub close: u32,
    /// Blocks properly nested inside this one, in document order
    pub children: Vec<Block>,
}

impl Block {
    /// First axis index of the body (may exceed `body_end` for empty bodies)
    pub fn body_start(&self) -> u32 {
        self.open + 1
    }

    /// Last axis index of the body, if the body is non-empty
    pub fn body_end(&self) -> Option<u32> {
        (self.close > self.open + 1).then(|| self.close - 1)
    }
}

/// Build the block forest for one axis from a scanned directive list.
///
/// Directives must be in document order (as produced by `directive::scan`).
pub fn build_blocks(axis: Axis, directives: &[Directive]) -> Result<Vec<Block>> {
    struct Frame {
        kind: DirectiveKind,
        open: u32,
        children: Vec<Block>,
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut roots: Vec<Block> = Vec::new();

    for directive in directives {
        if directive.kind.is_open() {
            stack.push(Frame {
                kind: directive.kind.clone(),
                open: directive.index,
                children: Vec::new(),
            });
            continue;
        }

        let Some(frame) = stack.pop() else {
            return Err(Error::MismatchedDirective {
                axis,
                index: directive.index,
                found: directive.kind.tag_name().to_string(),
                expected: "no open block".to_string(),
            });
        };
        if !directive.kind.closes(&frame.kind) {
            return Err(Error::MismatchedDirective {
                axis,
                index: directive.index,
                found: directive.kind.tag_name().to_string(),
                expected: format!("{{% {} %}}", frame.kind.expected_close()),
            });
        }

        let kind = match frame.kind {
            DirectiveKind::LoopOpen { var, iterable } => BlockKind::Loop { var, iterable },
            DirectiveKind::CondOpen { condition } => BlockKind::Cond { condition },
            _ => unreachable!("only open directives are pushed"),
        };
        let block = Block {
            kind,
            open: frame.open,
            close: directive.index,
            children: frame.children,
        };
        match stack.last_mut() {
            Some(parent) => parent.children.push(block),
            None => roots.push(block),
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(Error::UnclosedDirective {
            axis,
            index: frame.open,
            tag: frame.kind.tag_name().to_string(),
        });
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_for(index: u32, var: &str, iterable: &str) -> Directive {
        Directive {
            axis: Axis::Row,
            kind: DirectiveKind::LoopOpen {
                var: var.into(),
                iterable: iterable.into(),
            },
            index,
            row: index,
            col: 0,
            text: format!("{{% for {var} in {iterable} %}}"),
        }
    }

    fn open_if(index: u32, condition: &str) -> Directive {
        Directive {
            axis: Axis::Row,
            kind: DirectiveKind::CondOpen {
                condition: condition.into(),
            },
            index,
            row: index,
            col: 0,
            text: format!("{{% if {condition} %}}"),
        }
    }

    fn close(index: u32, kind: DirectiveKind) -> Directive {
        Directive {
            axis: Axis::Row,
            kind,
            index,
            row: index,
            col: 0,
            text: String::new(),
        }
    }

    #[test]
    fn test_single_loop() {
        let directives = vec![
            open_for(1, "x", "xs"),
            close(3, DirectiveKind::LoopClose),
        ];
        let blocks = build_blocks(Axis::Row, &directives).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].open, 1);
        assert_eq!(blocks[0].close, 3);
        assert_eq!(blocks[0].body_start(), 2);
        assert_eq!(blocks[0].body_end(), Some(2));
        assert!(blocks[0].children.is_empty());
    }

    #[test]
    fn test_empty_body() {
        let directives = vec![
            open_for(0, "x", "xs"),
            close(1, DirectiveKind::LoopClose),
        ];
        let blocks = build_blocks(Axis::Row, &directives).unwrap();
        assert_eq!(blocks[0].body_end(), None);
    }

    #[test]
    fn test_nested_blocks() {
        let directives = vec![
            open_for(0, "g", "groups"),
            open_for(2, "m", "g.members"),
            close(4, DirectiveKind::LoopClose),
            open_if(5, "g.active"),
            close(7, DirectiveKind::CondClose),
            close(8, DirectiveKind::LoopClose),
        ];
        let blocks = build_blocks(Axis::Row, &directives).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].children.len(), 2);
        assert!(matches!(blocks[0].children[0].kind, BlockKind::Loop { .. }));
        assert!(matches!(blocks[0].children[1].kind, BlockKind::Cond { .. }));
    }

    #[test]
    fn test_sibling_blocks() {
        let directives = vec![
            open_for(0, "a", "xs"),
            close(1, DirectiveKind::LoopClose),
            open_if(3, "flag"),
            close(5, DirectiveKind::CondClose),
        ];
        let blocks = build_blocks(Axis::Row, &directives).unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_unclosed_block() {
        let directives = vec![open_for(2, "x", "xs")];
        let err = build_blocks(Axis::Row, &directives).unwrap_err();
        assert!(matches!(
            err,
            Error::UnclosedDirective { index: 2, .. }
        ));
        assert!(err.to_string().contains("Unclosed"));
    }

    #[test]
    fn test_mismatched_close() {
        let directives = vec![
            open_for(0, "x", "xs"),
            close(2, DirectiveKind::CondClose),
        ];
        let err = build_blocks(Axis::Row, &directives).unwrap_err();
        assert!(err.to_string().contains("Mismatched"));
    }

    #[test]
    fn test_stray_close() {
        let directives = vec![close(4, DirectiveKind::LoopClose)];
        let err = build_blocks(Axis::Row, &directives).unwrap_err();
        assert!(matches!(err, Error::MismatchedDirective { index: 4, .. }));
    }
}
