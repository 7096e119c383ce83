use tree_sitter::Node;

use crate::format::context::{Context, ExpressionSpan};
use crate::format::nodes::declarations::collapse_whitespace;
use crate::format::nodes::{
    emit_verbatim, emit_verbatim_lines, flush_standalone_comments, has_embedded_comments,
    render_body,
};
use crate::format::output::FormattedOutput;
use crate::format::wrap::format_wrapped;

/// `if`/`elif`/`else` chain. Each branch header wraps like any expression;
/// an overlong condition splits inside added parentheses with the colon on
/// the closing line.
pub fn render_if(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let condition = node
        .child_by_field_name("condition")
        .or_else(|| first_named(node));
    let body = branch_body(node);
    render_branch("if ", condition, body, node.start_position().row + 1, ctx, out);

    let mut cursor = node.walk();
    let clauses: Vec<_> = node
        .children(&mut cursor)
        .filter(|c| matches!(c.kind(), "elif_clause" | "else_clause"))
        .collect();
    for clause in clauses {
        let clause_line = clause.start_position().row + 1;
        flush_standalone_comments(ctx, out, clause_line, false);
        let clause_body = branch_body(clause);
        if clause.kind() == "elif_clause" {
            let clause_condition = clause
                .child_by_field_name("condition")
                .or_else(|| first_named(clause));
            render_branch("elif ", clause_condition, clause_body, clause_line, ctx, out);
        } else {
            out.push_with_inline(
                format!("{}else:", ctx.indent_string),
                clause_line,
                clause_line,
                ctx.comments,
            );
            ctx.previously_processed_line = ctx.previously_processed_line.max(clause_line);
            render_body(clause_body, ctx, out);
        }
    }
}

/// `while condition:` with an indented body.
pub fn render_while(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let condition = node
        .child_by_field_name("condition")
        .or_else(|| first_named(node));
    let body = branch_body(node);
    render_branch("while ", condition, body, node.start_position().row + 1, ctx, out);
}

/// `for item in iterable:` with an indented body.
pub fn render_for(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = node.start_position().row + 1;
    let left = node
        .child_by_field_name("variable")
        .or_else(|| node.child_by_field_name("left"))
        .or_else(|| first_named(node));
    let right = node
        .child_by_field_name("value")
        .or_else(|| node.child_by_field_name("right"))
        .or_else(|| {
            let mut cursor = node.walk();
            let named: Vec<_> = node
                .named_children(&mut cursor)
                .filter(|c| !matches!(c.kind(), "comment" | "body"))
                .collect();
            named.get(1).copied()
        });
    let body = node
        .child_by_field_name("body")
        .or_else(|| find_kind(node, "body"));

    let (Some(left), Some(right)) = (left, right) else {
        emit_verbatim(node, ctx, out);
        return;
    };

    let header_end_line = right.end_position().row + 1;
    if has_embedded_comments(ctx, start_line, header_end_line) {
        emit_verbatim_lines(ctx, out, start_line, header_end_line);
    } else {
        let span = ExpressionSpan::new(
            format!("{}for {} in ", ctx.indent_string, ctx.node_text(left)),
            start_line,
            ":",
            header_end_line,
        );
        format_wrapped(right, &span, ctx, out);
    }
    ctx.previously_processed_line = ctx.previously_processed_line.max(header_end_line);
    render_body(body, ctx, out);
}

/// `match value:` with pattern sections one level deeper and their bodies
/// another level below that. Patterns are structural, they pass through with
/// whitespace collapsed rather than being reformatted.
pub fn render_match(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = node.start_position().row + 1;
    let value = node
        .child_by_field_name("value")
        .or_else(|| first_named(node));
    let body = node
        .child_by_field_name("body")
        .or_else(|| find_kind(node, "body"))
        .or_else(|| find_kind(node, "match_body"));

    // A match with no recognizable body keeps its source shape.
    let (Some(value), Some(body)) = (value, body) else {
        emit_verbatim(node, ctx, out);
        return;
    };

    let header_end_line = value.end_position().row + 1;
    if has_embedded_comments(ctx, start_line, header_end_line) {
        emit_verbatim_lines(ctx, out, start_line, header_end_line);
    } else {
        let span = ExpressionSpan::new(
            format!("{}match ", ctx.indent_string),
            start_line,
            ":",
            header_end_line,
        );
        format_wrapped(value, &span, ctx, out);
    }
    ctx.previously_processed_line = ctx.previously_processed_line.max(header_end_line);

    let mut inner = ctx.create_child_context(ctx.previously_processed_line);
    let mut cursor = body.walk();
    let sections: Vec<_> = body.named_children(&mut cursor).collect();
    for section in sections {
        if section.kind() == "comment" {
            continue;
        }
        flush_standalone_comments(&mut inner, out, section.start_position().row + 1, false);
        if section.kind() == "pattern_section" {
            render_pattern_section(section, &mut inner, out);
        } else {
            emit_verbatim(section, &mut inner, out);
        }
        inner.previously_processed_line = inner
            .previously_processed_line
            .max(section.end_position().row + 1);
    }
    flush_standalone_comments(&mut inner, out, body.end_position().row + 2, true);
    ctx.previously_processed_line = ctx
        .previously_processed_line
        .max(inner.previously_processed_line);
}

fn render_pattern_section(section: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = section.start_position().row + 1;
    let body = section
        .child_by_field_name("body")
        .or_else(|| find_kind(section, "body"));
    let Some(body) = body else {
        emit_verbatim(section, ctx, out);
        return;
    };
    // Comments between multiline patterns would be swallowed by the
    // whitespace collapse.
    if has_embedded_comments(ctx, start_line, body.start_position().row) {
        emit_verbatim(section, ctx, out);
        return;
    }

    let mut cursor = section.walk();
    let patterns: Vec<String> = section
        .children(&mut cursor)
        .filter(|c| c.is_named() && c.kind() != "comment" && c.end_byte() <= body.start_byte())
        .filter(|c| c.kind() != "body")
        .map(|c| collapse_whitespace(ctx.node_text(c)))
        .collect();

    if patterns.is_empty() {
        emit_verbatim(section, ctx, out);
        return;
    }

    out.push_with_inline(
        format!("{}{}:", ctx.indent_string, patterns.join(", ")),
        start_line,
        start_line,
        ctx.comments,
    );
    ctx.previously_processed_line = ctx.previously_processed_line.max(start_line);
    render_body(Some(body), ctx, out);
}

fn render_branch(
    keyword: &str,
    condition: Option<Node<'_>>,
    body: Option<Node<'_>>,
    start_line: usize,
    ctx: &mut Context<'_>,
    out: &mut FormattedOutput,
) {
    match condition {
        Some(condition) => {
            let header_end_line = condition.end_position().row + 1;
            if has_embedded_comments(ctx, start_line, header_end_line) {
                emit_verbatim_lines(ctx, out, start_line, header_end_line);
            } else {
                let span = ExpressionSpan::new(
                    format!("{}{}", ctx.indent_string, keyword),
                    start_line,
                    ":",
                    header_end_line,
                );
                format_wrapped(condition, &span, ctx, out);
            }
            ctx.previously_processed_line = ctx.previously_processed_line.max(header_end_line);
        }
        None => {
            out.push_with_inline(
                format!("{}{}:", ctx.indent_string, keyword.trim_end()),
                start_line,
                start_line,
                ctx.comments,
            );
            ctx.previously_processed_line = ctx.previously_processed_line.max(start_line);
        }
    }
    render_body(body, ctx, out);
}

fn branch_body<'t>(node: Node<'t>) -> Option<Node<'t>> {
    node.child_by_field_name("body")
        .or_else(|| node.child_by_field_name("consequence"))
        .or_else(|| find_kind(node, "body"))
}

fn first_named<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| !matches!(c.kind(), "comment" | "body"));
    found
}

fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}
