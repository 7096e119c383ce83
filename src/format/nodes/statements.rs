use tree_sitter::Node;

use crate::format::context::{Context, ExpressionSpan, PendingAnnotation};
use crate::format::nodes::expressions::format_expression;
use crate::format::nodes::{emit_verbatim, has_embedded_comments};
use crate::format::output::FormattedOutput;
use crate::format::wrap::format_wrapped;

/// `extends Base` or `extends "res://path.gd"`.
pub fn render_extends(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();
    let base = node
        .children(&mut cursor)
        .find(|c| c.is_named() && c.kind() != "comment");
    let content = match base {
        Some(base) => format!("{}extends {}", ctx.indent_string, ctx.node_text(base).trim()),
        None => format!("{}{}", ctx.indent_string, ctx.node_text(node).trim()),
    };
    out.push_with_inline(content, line, node.end_position().row + 1, ctx.comments);
}

/// `class_name Name`.
pub fn render_class_name(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();
    let name = node
        .children(&mut cursor)
        .find(|c| c.kind() == "name" || c.kind() == "identifier");
    let content = match name {
        Some(name) => format!("{}class_name {}", ctx.indent_string, ctx.node_text(name)),
        None => format!("{}{}", ctx.indent_string, ctx.node_text(node).trim()),
    };
    out.push_with_inline(content, line, node.end_position().row + 1, ctx.comments);
}

/// Bare keyword statements: pass, break, continue.
pub fn render_keyword(
    node: Node<'_>,
    keyword: &str,
    ctx: &mut Context<'_>,
    out: &mut FormattedOutput,
) {
    let line = node.start_position().row + 1;
    out.push_with_inline(
        format!("{}{}", ctx.indent_string, keyword),
        line,
        node.end_position().row + 1,
        ctx.comments,
    );
}

/// `return` with an optional value; a long value splits like any expression.
/// A multiline value carrying comments stays verbatim.
pub fn render_return(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let line = node.start_position().row + 1;
    if has_embedded_comments(ctx, line, node.end_position().row + 1) {
        emit_verbatim(node, ctx, out);
        return;
    }
    let mut cursor = node.walk();
    let value = node
        .children(&mut cursor)
        .find(|c| c.is_named() && c.kind() != "comment");
    match value {
        Some(value) => {
            let span = ExpressionSpan::new(
                format!("{}return ", ctx.indent_string),
                line,
                "",
                node.end_position().row + 1,
            );
            format_wrapped(value, &span, ctx, out);
        }
        None => out.push_with_inline(
            format!("{}return", ctx.indent_string),
            line,
            node.end_position().row + 1,
            ctx.comments,
        ),
    }
}

/// A bare expression as a statement (usually a call or assignment).
pub fn render_expression_statement(
    node: Node<'_>,
    ctx: &mut Context<'_>,
    out: &mut FormattedOutput,
) {
    let line = node.start_position().row + 1;
    if has_embedded_comments(ctx, line, node.end_position().row + 1) {
        emit_verbatim(node, ctx, out);
        return;
    }
    let mut cursor = node.walk();
    let inner = node
        .children(&mut cursor)
        .find(|c| c.is_named() && c.kind() != "comment");
    let target = inner.unwrap_or(node);
    let span = ExpressionSpan::new(
        ctx.indent_string.clone(),
        line,
        "",
        node.end_position().row + 1,
    );
    format_wrapped(target, &span, ctx, out);
}

/// Hold a block-level annotation until the construct it decorates renders,
/// one annotation per line. An `annotations` wrapper expands to its entries.
pub fn buffer_annotation(node: Node<'_>, ctx: &mut Context<'_>) {
    if node.kind() == "annotations" {
        let mut cursor = node.walk();
        let entries: Vec<_> = node
            .children(&mut cursor)
            .filter(|c| c.kind() == "annotation")
            .collect();
        for entry in entries {
            buffer_annotation(entry, ctx);
        }
        return;
    }
    ctx.pending_annotations.push(PendingAnnotation {
        line: node.start_position().row + 1,
        text: normalize_annotation(node, ctx),
    });
}

/// Annotations nested inside a declaration node (`@export var x`) stay on
/// the declaration's line; moving them out would restructure the tree.
/// Returns the rendered annotations with a trailing space, or empty.
pub fn leading_annotations(node: Node<'_>, ctx: &Context<'_>) -> String {
    let mut cursor = node.walk();
    let mut rendered = String::new();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "annotation" => {
                rendered.push_str(&normalize_annotation(child, ctx));
                rendered.push(' ');
            }
            "annotations" => {
                let mut inner_cursor = child.walk();
                for entry in child.children(&mut inner_cursor) {
                    if entry.kind() == "annotation" {
                        rendered.push_str(&normalize_annotation(entry, ctx));
                        rendered.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
    rendered
}

/// Emit buffered annotations, one per line, in source order.
pub fn flush_pending_annotations(ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let pending = std::mem::take(&mut ctx.pending_annotations);
    for annotation in pending {
        out.push_with_inline(
            format!("{}{}", ctx.indent_string, annotation.text),
            annotation.line,
            annotation.line,
            ctx.comments,
        );
        ctx.previously_processed_line = ctx.previously_processed_line.max(annotation.line);
    }
}

fn normalize_annotation(node: Node<'_>, ctx: &Context<'_>) -> String {
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    let name = children
        .iter()
        .find(|c| matches!(c.kind(), "identifier" | "name"))
        .map(|c| ctx.node_text(*c));
    let arguments = children
        .iter()
        .find(|c| c.kind() == "arguments" || c.kind() == "argument_list");

    match (name, arguments) {
        (Some(name), Some(args)) => {
            let rendered: Vec<String> = super::expressions::container_elements(*args)
                .iter()
                .map(|a| format_expression(*a, ctx))
                .collect();
            format!("@{}({})", name, rendered.join(", "))
        }
        (Some(name), None) => format!("@{}", name),
        _ => ctx.node_text(node).trim().to_string(),
    }
}
