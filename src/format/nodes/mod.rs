pub(crate) mod control_flow;
pub(crate) mod declarations;
pub(crate) mod expressions;
pub(crate) mod statements;

use tree_sitter::Node;

use super::blank_lines::{required_blank_lines, Category};
use super::context::Context;
use super::output::FormattedOutput;

/// Closed set of renderable node categories.
///
/// Tree-sitter reports kinds as strings; classifying them into this enum up
/// front keeps the dispatch exhaustive. Kinds the formatter does not model
/// classify as `Verbatim` and are re-emitted from the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Source,
    ClassDefinition,
    FunctionDefinition,
    VariableStatement,
    ConstStatement,
    SignalStatement,
    EnumDefinition,
    ExtendsStatement,
    ClassNameStatement,
    PassStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    ExpressionStatement,
    IfStatement,
    ForStatement,
    WhileStatement,
    MatchStatement,
    Annotation,
    Comment,
    Verbatim,
}

impl NodeKind {
    pub fn classify(kind: &str) -> NodeKind {
        match kind {
            "source" | "source_file" => NodeKind::Source,
            "class_definition" => NodeKind::ClassDefinition,
            "function_definition" | "constructor_definition" => NodeKind::FunctionDefinition,
            "variable_statement" | "onready_variable_statement" | "export_variable_statement" => {
                NodeKind::VariableStatement
            }
            "const_statement" => NodeKind::ConstStatement,
            "signal_statement" => NodeKind::SignalStatement,
            "enum_definition" => NodeKind::EnumDefinition,
            "extends_statement" => NodeKind::ExtendsStatement,
            "class_name_statement" => NodeKind::ClassNameStatement,
            "pass_statement" => NodeKind::PassStatement,
            "break_statement" => NodeKind::BreakStatement,
            "continue_statement" => NodeKind::ContinueStatement,
            "return_statement" => NodeKind::ReturnStatement,
            "expression_statement" => NodeKind::ExpressionStatement,
            "if_statement" => NodeKind::IfStatement,
            "for_statement" => NodeKind::ForStatement,
            "while_statement" => NodeKind::WhileStatement,
            "match_statement" => NodeKind::MatchStatement,
            "annotation" | "annotations" => NodeKind::Annotation,
            "comment" => NodeKind::Comment,
            _ => NodeKind::Verbatim,
        }
    }
}

/// Render one node with the rule for its category.
pub fn render_node(node: Node<'_>, kind: NodeKind, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    match kind {
        NodeKind::Source => render_block(node, ctx, out),
        NodeKind::ClassDefinition => declarations::render_class(node, ctx, out),
        NodeKind::FunctionDefinition => declarations::render_function(node, ctx, out),
        NodeKind::VariableStatement => declarations::render_variable(node, ctx, out),
        NodeKind::ConstStatement => declarations::render_const(node, ctx, out),
        NodeKind::SignalStatement => declarations::render_signal(node, ctx, out),
        NodeKind::EnumDefinition => declarations::render_enum(node, ctx, out),
        NodeKind::ExtendsStatement => statements::render_extends(node, ctx, out),
        NodeKind::ClassNameStatement => statements::render_class_name(node, ctx, out),
        NodeKind::PassStatement => statements::render_keyword(node, "pass", ctx, out),
        NodeKind::BreakStatement => statements::render_keyword(node, "break", ctx, out),
        NodeKind::ContinueStatement => statements::render_keyword(node, "continue", ctx, out),
        NodeKind::ReturnStatement => statements::render_return(node, ctx, out),
        NodeKind::ExpressionStatement => statements::render_expression_statement(node, ctx, out),
        NodeKind::IfStatement => control_flow::render_if(node, ctx, out),
        NodeKind::ForStatement => control_flow::render_for(node, ctx, out),
        NodeKind::WhileStatement => control_flow::render_while(node, ctx, out),
        NodeKind::MatchStatement => control_flow::render_match(node, ctx, out),
        // Annotations are buffered by the block loop; reaching here means a
        // bare annotation outside a block, render it in place.
        NodeKind::Annotation => {
            statements::buffer_annotation(node, ctx);
            statements::flush_pending_annotations(ctx, out);
        }
        NodeKind::Comment => {}
        NodeKind::Verbatim => emit_verbatim(node, ctx, out),
    }
}

/// Render the statements of one scope: blank lines between constructs come
/// from the policy in effect, standalone comments in the gap before each
/// construct are flushed first, and annotations buffer until the construct
/// they precede.
pub fn render_block(parent: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let mut cursor = parent.walk();
    let children: Vec<_> = parent.children(&mut cursor).collect();
    let mut prev: Option<Category> = None;

    for child in children {
        if !child.is_named() {
            continue;
        }
        let kind = NodeKind::classify(child.kind());
        if kind == NodeKind::Comment {
            continue;
        }
        if kind == NodeKind::Annotation {
            statements::buffer_annotation(child, ctx);
            continue;
        }

        let start_line = child.start_position().row + 1;
        let category = Category::of(child.kind());

        let count = required_blank_lines(prev.unwrap_or(Category::FileStart), category, ctx);
        if prev.is_some() {
            out.push_blank_lines(count);
        }

        // Comments above the first pending annotation belong before it;
        // comments between the annotations and the construct come after.
        let boundary = ctx
            .pending_annotations
            .first()
            .map(|a| a.line)
            .unwrap_or(start_line);
        flush_standalone_comments(ctx, out, boundary, false);
        statements::flush_pending_annotations(ctx, out);
        flush_standalone_comments(ctx, out, start_line, false);

        if ctx.is_skipped(start_line) {
            emit_verbatim(child, ctx, out);
        } else {
            render_node(child, kind, ctx, out);
        }
        ctx.previously_processed_line = ctx
            .previously_processed_line
            .max(child.end_position().row + 1);
        prev = Some(category);
    }

    statements::flush_pending_annotations(ctx, out);
    // Comments trailing the last statement of this scope.
    flush_standalone_comments(ctx, out, parent.end_position().row + 2, true);
}

/// Emit the standalone comments between the line cursor and `before_line`
/// (exclusive), re-indented to this scope. Gaps between consecutive comments
/// are preserved capped at one blank line. In trailing mode the gap before
/// the first comment is preserved instead of the gap after the last.
pub fn flush_standalone_comments(
    ctx: &mut Context<'_>,
    out: &mut FormattedOutput,
    before_line: usize,
    trailing: bool,
) {
    let from = ctx.previously_processed_line + 1;
    let found: Vec<(usize, String)> = ctx
        .comments
        .standalone_in(from, before_line)
        .into_iter()
        .map(|(line, text)| (line, text.to_string()))
        .collect();

    let mut last: Option<usize> = None;
    for (line, text) in found {
        match last {
            Some(prev) if line > prev + 1 => out.push_empty(),
            None if trailing && ctx.previously_processed_line > 0
                && line > ctx.previously_processed_line + 1 =>
            {
                out.push_empty()
            }
            _ => {}
        }
        out.push_mapped(format!("{}{}", ctx.indent_string, text), line);
        ctx.previously_processed_line = line;
        last = Some(line);
    }

    if let Some(prev) = last {
        if !trailing && before_line > prev + 1 {
            out.push_empty();
        }
    }
}

/// Output a node's original source lines untouched (skip regions, match
/// fallbacks, constructs with embedded comments, unmodeled kinds).
pub fn emit_verbatim(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    emit_verbatim_lines(
        ctx,
        out,
        node.start_position().row + 1,
        node.end_position().row + 1,
    );
}

/// Output a source line range (1-indexed, inclusive) untouched. Used for
/// headers whose condition carries comments while the body still formats.
pub fn emit_verbatim_lines(
    ctx: &mut Context<'_>,
    out: &mut FormattedOutput,
    start_line: usize,
    end_line: usize,
) {
    for line_num in start_line..=end_line {
        if let Some(line) = ctx.source_line(line_num) {
            out.push_mapped(line.to_string(), line_num);
        }
    }
    ctx.previously_processed_line = ctx.previously_processed_line.max(end_line);
}

/// True when reflowing source lines `start_line..=end_line` onto rendered
/// lines would drop a comment: any standalone comment inside the range, or
/// an inline comment anywhere but the last line (that one is reattached to
/// the construct's final rendered line).
pub fn has_embedded_comments(ctx: &Context<'_>, start_line: usize, end_line: usize) -> bool {
    if end_line <= start_line {
        return false;
    }
    if !ctx
        .comments
        .standalone_in(start_line + 1, end_line + 1)
        .is_empty()
    {
        return true;
    }
    (start_line..end_line).any(|line| ctx.comments.inline(line).is_some())
}

/// Render a composite construct's body one level deeper. An absent or empty
/// body renders as a lone `pass`.
pub fn render_body(body: Option<Node<'_>>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let mut child = ctx.create_child_context(ctx.previously_processed_line);
    match body {
        Some(body) if has_renderable_children(body) => render_block(body, &mut child, out),
        _ => out.push_line(format!("{}pass", child.indent_string)),
    }
    ctx.previously_processed_line = ctx
        .previously_processed_line
        .max(child.previously_processed_line);
}

fn has_renderable_children(body: Node<'_>) -> bool {
    let mut cursor = body.walk();
    let found = body
        .named_children(&mut cursor)
        .any(|c| c.kind() != "comment");
    found
}
