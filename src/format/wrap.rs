//! Line-length-driven wrapping.
//!
//! A statement renders its unwrapped single-line form first; only when that
//! exceeds the budget (or the source demands the multiline form via a
//! trailing comma) does a category-specific split strategy run. Splitting is
//! local and greedy: fragments are re-measured individually and a fragment
//! with no legal split point is emitted as-is, surfacing later as an
//! overlong-line warning.

use tree_sitter::Node;

use super::context::{Context, ExpressionSpan};
use super::nodes::expressions::{
    call_parts, container_elements, format_expression, format_pair, has_trailing_comma,
    parenthesized_inner,
};
use super::output::FormattedOutput;

/// Render one logical line, splitting it when it exceeds the length budget.
pub fn format_wrapped(
    node: Node<'_>,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    let single = format!("{}{}{}", span.prefix, format_expression(node, ctx), span.suffix);
    if !ctx.exceeds_line_length(&single) && !forces_multiline(node) {
        out.push_with_inline(single, span.prefix_line, span.suffix_line, ctx.comments);
        return;
    }
    split_expression(node, span, ctx, out);
}

/// A trailing comma in the source forces the multiline form, which also
/// keeps the multiline form stable across repeated runs.
pub fn forces_multiline(node: Node<'_>) -> bool {
    match node.kind() {
        "array" | "dictionary" => has_trailing_comma(node),
        "call" => call_parts(node)
            .and_then(|(_, args)| args)
            .map(has_trailing_comma)
            .unwrap_or(false),
        _ => false,
    }
}

fn split_expression(
    node: Node<'_>,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    match node.kind() {
        "call" => split_call(node, span, ctx, out),
        "array" => {
            let elements = container_elements(node);
            emit_container(format!("{}[", span.prefix), &elements, "]", span, ctx, out);
        }
        "dictionary" => {
            let entries = container_elements(node);
            emit_container(format!("{}{{", span.prefix), &entries, "}", span, ctx, out);
        }
        "parenthesized_expression" => match parenthesized_inner(node) {
            Some(inner) if is_splittable(inner.kind()) => split_expression(inner, span, ctx, out),
            _ => emit_unsplit(node, span, ctx, out),
        },
        "binary_operator" | "boolean_operator" | "comparison_operator" => {
            split_operator_chain(node, span, ctx, out)
        }
        "assignment" | "augmented_assignment" => split_assignment(node, span, ctx, out),
        "conditional_expression" | "ternary_expression" => split_ternary(node, span, ctx, out),
        "await" | "await_expression" => {
            let mut cursor = node.walk();
            let operand = node.children(&mut cursor).find(|c| c.kind() != "await");
            match operand {
                Some(operand) if is_splittable(operand.kind()) => {
                    let extended = ExpressionSpan::new(
                        format!("{}await ", span.prefix),
                        span.prefix_line,
                        span.suffix.clone(),
                        span.suffix_line,
                    );
                    split_expression(operand, &extended, ctx, out);
                }
                _ => emit_unsplit(node, span, ctx, out),
            }
        }
        "pair" => split_pair(node, span, ctx, out),
        // No legal split point: emit as-is.
        _ => emit_unsplit(node, span, ctx, out),
    }
}

fn is_splittable(kind: &str) -> bool {
    matches!(
        kind,
        "call"
            | "array"
            | "dictionary"
            | "parenthesized_expression"
            | "binary_operator"
            | "boolean_operator"
            | "comparison_operator"
            | "assignment"
            | "augmented_assignment"
            | "conditional_expression"
            | "ternary_expression"
    )
}

fn emit_unsplit(
    node: Node<'_>,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    let single = format!("{}{}{}", span.prefix, format_expression(node, ctx), span.suffix);
    out.push_with_inline(single, span.prefix_line, span.suffix_line, ctx.comments);
}

fn split_call(node: Node<'_>, span: &ExpressionSpan, ctx: &Context<'_>, out: &mut FormattedOutput) {
    let Some((function, arguments)) = call_parts(node) else {
        emit_unsplit(node, span, ctx, out);
        return;
    };
    let elements = arguments.map(container_elements).unwrap_or_default();
    if elements.is_empty() {
        emit_unsplit(node, span, ctx, out);
        return;
    }
    let header = format!("{}{}(", span.prefix, format_expression(function, ctx));
    emit_container(header, &elements, ")", span, ctx, out);
}

/// One element per line at one extra indent level, each with a trailing
/// comma, closer back at the statement's indent.
fn emit_container(
    header: String,
    elements: &[Node<'_>],
    closer: &str,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    out.push_mapped(header, span.prefix_line);
    let inner = ctx.create_child_context(ctx.previously_processed_line);
    for element in elements {
        let line = element.start_position().row + 1;
        let rendered = if element.kind() == "pair" {
            format_pair(*element, &inner)
        } else {
            format_expression(*element, &inner)
        };
        let single = format!("{}{},", inner.indent_string, rendered);
        if !inner.exceeds_line_length(&single) && !forces_multiline(*element) {
            out.push_mapped(single, line);
        } else {
            let elem_span = ExpressionSpan::new(
                inner.indent_string.clone(),
                line,
                ",",
                element.end_position().row + 1,
            );
            split_expression(*element, &elem_span, &inner, out);
        }
    }
    out.push_with_inline(
        format!("{}{}{}", ctx.indent_string, closer, span.suffix),
        span.suffix_line,
        span.suffix_line,
        ctx.comments,
    );
}

/// Break an operator chain one operand per line, operator leading the
/// continuation lines. GDScript requires parentheses for the continuation,
/// so the split adds them; a later run sees the parenthesized expression
/// and reproduces the same shape.
fn split_operator_chain(
    node: Node<'_>,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    let mut parts = Vec::new();
    flatten_chain(node, ctx, &mut parts);
    if parts.len() < 2 {
        emit_unsplit(node, span, ctx, out);
        return;
    }

    out.push_mapped(format!("{}(", span.prefix), span.prefix_line);
    let inner = ctx.create_child_context(ctx.previously_processed_line);
    for (operator, operand) in &parts {
        let lead = match operator {
            Some(op) => format!("{} ", op),
            None => String::new(),
        };
        let line = operand.start_position().row + 1;
        let single = format!(
            "{}{}{}",
            inner.indent_string,
            lead,
            format_expression(*operand, &inner)
        );
        if !inner.exceeds_line_length(&single) && !forces_multiline(*operand) {
            out.push_mapped(single, line);
        } else {
            let operand_span = ExpressionSpan::new(
                format!("{}{}", inner.indent_string, lead),
                line,
                "",
                operand.end_position().row + 1,
            );
            split_expression(*operand, &operand_span, &inner, out);
        }
    }
    out.push_with_inline(
        format!("{}){}", ctx.indent_string, span.suffix),
        span.suffix_line,
        span.suffix_line,
        ctx.comments,
    );
}

/// Flatten the left spine of an operator chain into (operator, operand)
/// pairs; the leftmost operand carries no operator.
fn flatten_chain<'t>(
    node: Node<'t>,
    ctx: &Context<'_>,
    parts: &mut Vec<(Option<String>, Node<'t>)>,
) {
    let mut cursor = node.walk();
    let children: Vec<_> = node
        .children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect();

    // "not in" / "is not" spell the operator as two tokens
    if children.len() == 4 && children[1].kind() == "not" && children[2].kind() == "in" {
        push_operand(children[0], ctx, parts);
        parts.push((Some("not in".to_string()), children[3]));
        return;
    }
    if children.len() == 4 && children[1].kind() == "is" && children[2].kind() == "not" {
        push_operand(children[0], ctx, parts);
        parts.push((Some("is not".to_string()), children[3]));
        return;
    }

    if children.len() >= 3 && children.len() % 2 == 1 {
        push_operand(children[0], ctx, parts);
        let mut i = 1;
        while i + 1 < children.len() {
            let op = normalize_operator(ctx.node_text(children[i]).trim());
            parts.push((Some(op), children[i + 1]));
            i += 2;
        }
        return;
    }

    parts.push((None, node));
}

fn push_operand<'t>(
    operand: Node<'t>,
    ctx: &Context<'_>,
    parts: &mut Vec<(Option<String>, Node<'t>)>,
) {
    if matches!(
        operand.kind(),
        "binary_operator" | "boolean_operator" | "comparison_operator"
    ) {
        flatten_chain(operand, ctx, parts);
    } else {
        parts.push((None, operand));
    }
}

fn normalize_operator(op: &str) -> String {
    match op {
        "&&" => "and".to_string(),
        "||" => "or".to_string(),
        other => other.to_string(),
    }
}

/// `lhs = long_rhs` splits by extending the prefix over the left side and
/// recursing into the right side.
fn split_assignment(
    node: Node<'_>,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    let left = node.child_by_field_name("left");
    let right = node.child_by_field_name("right");
    let operator = node
        .child_by_field_name("operator")
        .map(|op| ctx.node_text(op).to_string())
        .unwrap_or_else(|| "=".to_string());

    match (left, right) {
        (Some(l), Some(r)) if is_splittable(r.kind()) => {
            let extended = ExpressionSpan::new(
                format!("{}{} {} ", span.prefix, format_expression(l, ctx), operator),
                span.prefix_line,
                span.suffix.clone(),
                span.suffix_line,
            );
            split_expression(r, &extended, ctx, out);
        }
        _ => emit_unsplit(node, span, ctx, out),
    }
}

fn split_pair(
    node: Node<'_>,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    let key = node.child_by_field_name("key");
    let value = node.child_by_field_name("value");
    match (key, value) {
        (Some(k), Some(v)) if is_splittable(v.kind()) => {
            let extended = ExpressionSpan::new(
                format!("{}{}: ", span.prefix, format_expression(k, ctx)),
                span.prefix_line,
                span.suffix.clone(),
                span.suffix_line,
            );
            split_expression(v, &extended, ctx, out);
        }
        _ => {
            let single = format!("{}{}{}", span.prefix, format_pair(node, ctx), span.suffix);
            out.push_with_inline(single, span.prefix_line, span.suffix_line, ctx.comments);
        }
    }
}

fn split_ternary(
    node: Node<'_>,
    span: &ExpressionSpan,
    ctx: &Context<'_>,
    out: &mut FormattedOutput,
) {
    let true_val = node.child_by_field_name("true");
    let condition = node.child_by_field_name("condition");
    let false_val = node.child_by_field_name("false");

    let (Some(t), Some(c), Some(f)) = (true_val, condition, false_val) else {
        emit_unsplit(node, span, ctx, out);
        return;
    };

    out.push_mapped(format!("{}(", span.prefix), span.prefix_line);
    let inner = ctx.create_child_context(ctx.previously_processed_line);
    out.push_mapped(
        format!("{}{}", inner.indent_string, format_expression(t, &inner)),
        t.start_position().row + 1,
    );
    out.push_mapped(
        format!("{}if {}", inner.indent_string, format_expression(c, &inner)),
        c.start_position().row + 1,
    );
    out.push_mapped(
        format!("{}else {}", inner.indent_string, format_expression(f, &inner)),
        f.start_position().row + 1,
    );
    out.push_with_inline(
        format!("{}){}", ctx.indent_string, span.suffix),
        span.suffix_line,
        span.suffix_line,
        ctx.comments,
    );
}
