use tree_sitter::Node;

use crate::format::context::{Context, ExpressionSpan};
use crate::format::nodes::expressions::{container_elements, format_expression, has_trailing_comma};
use crate::format::nodes::statements::leading_annotations;
use crate::format::nodes::{emit_verbatim, emit_verbatim_lines, has_embedded_comments, render_body};
use crate::format::output::FormattedOutput;
use crate::format::wrap::format_wrapped;

/// `class Name:` / `class Name extends Base:` with an indented body.
pub fn render_class(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = node.start_position().row + 1;
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    let name = children
        .iter()
        .find(|c| matches!(c.kind(), "name" | "identifier"))
        .map(|c| ctx.node_text(*c));
    let Some(name) = name else {
        emit_verbatim(node, ctx, out);
        return;
    };

    let base = children
        .iter()
        .find(|c| c.kind() == "extends_statement")
        .map(|c| collapse_whitespace(ctx.node_text(*c)));

    let header = match base {
        Some(base) => format!("{}class {} {}:", ctx.indent_string, name, base),
        None => format!("{}class {}:", ctx.indent_string, name),
    };
    out.push_with_inline(header, start_line, start_line, ctx.comments);
    ctx.previously_processed_line = ctx.previously_processed_line.max(start_line);

    let body = node.child_by_field_name("body").or_else(|| {
        children.iter().find(|c| c.kind() == "body").copied()
    });
    render_body(body, ctx, out);
}

/// `func name(params) -> Ret:` with an indented body. An overlong header or
/// a trailing comma in the parameter list puts one parameter per line.
pub fn render_function(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = node.start_position().row + 1;
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    let name = children
        .iter()
        .find(|c| matches!(c.kind(), "name" | "identifier"))
        .map(|c| ctx.node_text(*c))
        .unwrap_or("_init");
    let params_node = children.iter().find(|c| c.kind() == "parameters").copied();
    let return_part = children
        .iter()
        .find(|c| c.kind() == "return_type")
        .map(|c| format!(" {}", collapse_whitespace(ctx.node_text(*c))))
        .unwrap_or_default();
    let body = node
        .child_by_field_name("body")
        .or_else(|| children.iter().find(|c| c.kind() == "body").copied());

    let params: Vec<(Node<'_>, String)> = params_node
        .map(container_elements)
        .unwrap_or_default()
        .into_iter()
        .map(|p| (p, format_parameter(p, ctx)))
        .collect();

    let header_end_line = params_node
        .map(|p| p.end_position().row + 1)
        .unwrap_or(start_line);

    // A comment inside the parameter list survives only in the source shape.
    if has_embedded_comments(ctx, start_line, header_end_line) {
        emit_verbatim_lines(ctx, out, start_line, header_end_line);
        render_body(body, ctx, out);
        return;
    }

    let annotations = leading_annotations(node, ctx);
    let joined: Vec<&str> = params.iter().map(|(_, s)| s.as_str()).collect();
    let single = format!(
        "{}{}func {}({}){}:",
        ctx.indent_string,
        annotations,
        name,
        joined.join(", "),
        return_part
    );
    let force_split = params_node.map(has_trailing_comma).unwrap_or(false);

    if !ctx.exceeds_line_length(&single) && !force_split {
        out.push_with_inline(single, start_line, header_end_line, ctx.comments);
    } else {
        out.push_mapped(
            format!("{}{}func {}(", ctx.indent_string, annotations, name),
            start_line,
        );
        let inner = ctx.create_child_context(ctx.previously_processed_line);
        for (param, rendered) in &params {
            out.push_mapped(
                format!("{}{},", inner.indent_string, rendered),
                param.start_position().row + 1,
            );
        }
        out.push_with_inline(
            format!("{}){}:", ctx.indent_string, return_part),
            header_end_line,
            header_end_line,
            ctx.comments,
        );
    }

    ctx.previously_processed_line = ctx.previously_processed_line.max(header_end_line);
    render_body(body, ctx, out);
}

/// `var name[: Type] [= value]`, with the value splitting when overlong.
///
/// Getter/setter declarations and multiline right sides carrying comments
/// stay verbatim.
pub fn render_variable(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let keyword = match node.kind() {
        "onready_variable_statement" => "onready var",
        "export_variable_statement" => "export var",
        _ => "var",
    };
    if has_child_kind(node, &["setget", "set_body", "get_body", "body"]) {
        emit_verbatim(node, ctx, out);
        return;
    }
    render_binding(node, keyword, ctx, out);
}

/// `const NAME[: Type] = value`.
pub fn render_const(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    render_binding(node, "const", ctx, out);
}

fn render_binding(node: Node<'_>, keyword: &str, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = node.start_position().row + 1;
    let end_line = node.end_position().row + 1;

    // A multiline right side with embedded comments cannot be reflowed
    // without dropping them.
    if has_embedded_comments(ctx, start_line, end_line) {
        emit_verbatim(node, ctx, out);
        return;
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    let name = children
        .iter()
        .find(|c| matches!(c.kind(), "name" | "identifier"))
        .copied();
    let Some(name) = name else {
        emit_verbatim(node, ctx, out);
        return;
    };

    let ty = node
        .child_by_field_name("type")
        .or_else(|| children.iter().find(|c| c.kind() == "type").copied());
    let value = node.child_by_field_name("value").or_else(|| {
        children
            .iter()
            .rev()
            .find(|c| {
                c.is_named()
                    && !matches!(c.kind(), "comment" | "name" | "identifier" | "type")
                    && c.start_byte() > name.end_byte()
            })
            .copied()
    });

    let annotations = leading_annotations(node, ctx);
    let mut prefix = format!(
        "{}{}{} {}",
        ctx.indent_string,
        annotations,
        keyword,
        ctx.node_text(name)
    );
    if let Some(ty) = ty {
        prefix.push_str(": ");
        prefix.push_str(collapse_whitespace(ctx.node_text(ty)).as_str());
    }

    match value {
        Some(value) => {
            // `:=` is spelled between the name and the value in the source.
            let between = &ctx.source[name.end_byte()..value.start_byte()];
            let inferred = ty.is_none() && between.contains(":=");
            prefix.push_str(if inferred { " := " } else { " = " });
            let span = ExpressionSpan::new(prefix, start_line, "", end_line);
            format_wrapped(value, &span, ctx, out);
        }
        None => out.push_with_inline(prefix, start_line, end_line, ctx.comments),
    }
}

/// `signal name` / `signal name(a, b: int)`.
pub fn render_signal(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = node.start_position().row + 1;
    let end_line = node.end_position().row + 1;
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    let name = children
        .iter()
        .find(|c| matches!(c.kind(), "name" | "identifier"))
        .map(|c| ctx.node_text(*c));
    let Some(name) = name else {
        emit_verbatim(node, ctx, out);
        return;
    };
    if has_embedded_comments(ctx, start_line, end_line) {
        emit_verbatim(node, ctx, out);
        return;
    }

    let params = children.iter().find(|c| c.kind() == "parameters").copied();
    let content = match params {
        Some(params) => {
            let rendered: Vec<String> = container_elements(params)
                .into_iter()
                .map(|p| format_parameter(p, ctx))
                .collect();
            format!("{}signal {}({})", ctx.indent_string, name, rendered.join(", "))
        }
        None => format!("{}signal {}", ctx.indent_string, name),
    };
    out.push_with_inline(content, start_line, end_line, ctx.comments);
}

/// `enum Name { A, B = 1 }`, going one-enumerator-per-line when overlong or
/// when the source carries a trailing comma.
pub fn render_enum(node: Node<'_>, ctx: &mut Context<'_>, out: &mut FormattedOutput) {
    let start_line = node.start_position().row + 1;
    let end_line = node.end_position().row + 1;

    if has_embedded_comments(ctx, start_line, end_line) {
        emit_verbatim(node, ctx, out);
        return;
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    let name = children
        .iter()
        .find(|c| matches!(c.kind(), "name" | "identifier"))
        .map(|c| ctx.node_text(*c));
    let list = children
        .iter()
        .find(|c| c.kind() == "enumerator_list")
        .copied();

    let head = match name {
        Some(name) => format!("{}enum {} ", ctx.indent_string, name),
        None => format!("{}enum ", ctx.indent_string),
    };

    let enumerators: Vec<(Node<'_>, String)> = list
        .map(container_elements)
        .unwrap_or_default()
        .into_iter()
        .map(|e| (e, format_enumerator(e, ctx)))
        .collect();

    if enumerators.is_empty() {
        out.push_with_inline(format!("{}{{}}", head), start_line, end_line, ctx.comments);
        return;
    }

    let joined: Vec<&str> = enumerators.iter().map(|(_, s)| s.as_str()).collect();
    let single = format!("{}{{ {} }}", head, joined.join(", "));
    let force_split = list.map(has_trailing_comma).unwrap_or(false);

    if !ctx.exceeds_line_length(&single) && !force_split {
        out.push_with_inline(single, start_line, end_line, ctx.comments);
        return;
    }

    out.push_mapped(format!("{}{{", head), start_line);
    let inner = ctx.create_child_context(ctx.previously_processed_line);
    for (enumerator, rendered) in &enumerators {
        out.push_mapped(
            format!("{}{},", inner.indent_string, rendered),
            enumerator.start_position().row + 1,
        );
    }
    out.push_with_inline(
        format!("{}}}", ctx.indent_string),
        end_line,
        end_line,
        ctx.comments,
    );
}

fn format_enumerator(node: Node<'_>, ctx: &Context<'_>) -> String {
    let mut cursor = node.walk();
    let named: Vec<_> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect();
    match named.len() {
        1 => ctx.node_text(named[0]).to_string(),
        2 => format!(
            "{} = {}",
            ctx.node_text(named[0]),
            format_expression(named[1], ctx)
        ),
        _ => collapse_whitespace(ctx.node_text(node)),
    }
}

fn format_parameter(node: Node<'_>, ctx: &Context<'_>) -> String {
    let mut cursor = node.walk();
    let named: Vec<_> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect();
    match node.kind() {
        "identifier" | "name" => ctx.node_text(node).to_string(),
        "typed_parameter" if named.len() == 2 => format!(
            "{}: {}",
            ctx.node_text(named[0]),
            collapse_whitespace(ctx.node_text(named[1]))
        ),
        "default_parameter" if named.len() == 2 => format!(
            "{} = {}",
            ctx.node_text(named[0]),
            format_expression(named[1], ctx)
        ),
        "typed_default_parameter" if named.len() == 3 => format!(
            "{}: {} = {}",
            ctx.node_text(named[0]),
            collapse_whitespace(ctx.node_text(named[1])),
            format_expression(named[2], ctx)
        ),
        _ => collapse_whitespace(ctx.node_text(node)),
    }
}

fn has_child_kind(node: Node<'_>, kinds: &[&str]) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| kinds.contains(&c.kind()));
    found
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
