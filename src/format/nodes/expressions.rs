use tree_sitter::Node;

use crate::format::context::Context;

/// Render an expression as a single-line string.
///
/// Length-driven splitting happens one layer up (see `format::wrap`); this
/// module only normalizes spacing within one logical line.
pub fn format_expression(node: Node<'_>, ctx: &Context<'_>) -> String {
    match node.kind() {
        // Literals
        "integer" | "float" | "string" | "true" | "false" | "null" => {
            ctx.node_text(node).to_string()
        }

        // Identifiers
        "identifier" | "name" => ctx.node_text(node).to_string(),

        "self" => "self".to_string(),

        "binary_operator" => format_binary_operation(node, ctx),
        "unary_operator" => format_unary_operation(node, ctx),
        "comparison_operator" => format_comparison(node, ctx),
        "boolean_operator" => format_boolean_operation(node, ctx),

        "call" => format_call(node, ctx),

        // Attribute access: obj.attr
        "attribute" => format_attribute(node, ctx),

        // Subscript access: arr[idx]
        "subscript" => format_subscript(node, ctx),

        "array" => format_array(node, ctx),
        "dictionary" => format_dictionary(node, ctx),

        "parenthesized_expression" => format_parenthesized(node, ctx),

        "assignment" => format_assignment(node, ctx),
        "augmented_assignment" => format_augmented_assignment(node, ctx),

        // Ternary: value_if_true if condition else value_if_false
        "conditional_expression" | "ternary_expression" => format_ternary(node, ctx),

        // Lambdas keep their source text; reflowing a multi-line closure
        // body inside an expression is not attempted.
        "lambda" => ctx.node_text(node).to_string(),

        "cast" => format_cast(node, ctx),

        "await" | "await_expression" => format_await(node, ctx),

        // Node paths: $NodePath / %UniqueNode
        "get_node" => ctx.node_text(node).to_string(),

        _ => ctx.node_text(node).to_string(),
    }
}

/// The inner expression of a parenthesized expression, if any.
pub fn parenthesized_inner<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let inner = node
        .children(&mut cursor)
        .find(|c| c.is_named() && c.kind() != "comment");
    inner
}

/// Check if a container node (array, dictionary, arguments) has a trailing
/// comma before its closing bracket. A trailing comma in the source forces
/// the multiline rendering and keeps it stable across runs.
pub fn has_trailing_comma(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    let close_brackets = ["]", "}", ")"];
    let close_idx = children
        .iter()
        .rposition(|c| close_brackets.contains(&c.kind()));

    match close_idx {
        Some(idx) if idx > 0 => children[idx - 1].kind() == ",",
        _ => false,
    }
}

/// Collect the element nodes of a bracketed container, skipping punctuation.
pub fn container_elements<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "(" | ")" | "[" | "]" | "{" | "}" | "," | "comment"))
        .collect()
}

/// The callee and argument-list nodes of a call, when they can be found.
pub fn call_parts<'t>(node: Node<'t>) -> Option<(Node<'t>, Option<Node<'t>>)> {
    if let Some(function) = node.child_by_field_name("function") {
        return Some((function, node.child_by_field_name("arguments")));
    }

    // Field names absent in some grammar versions; fall back to children.
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    let function = children
        .iter()
        .find(|c| !matches!(c.kind(), "(" | ")" | ","))
        .copied()?;
    let arguments = children
        .iter()
        .find(|c| c.kind() == "argument_list" || c.kind() == "arguments")
        .copied();
    Some((function, arguments))
}

/// Format a key-value pair in a dictionary.
pub fn format_pair(node: Node<'_>, ctx: &Context<'_>) -> String {
    if let (Some(key), Some(value)) = (
        node.child_by_field_name("key"),
        node.child_by_field_name("value"),
    ) {
        return format!(
            "{}: {}",
            format_expression(key, ctx),
            format_expression(value, ctx)
        );
    }

    // Pair structure is typically: key, ":", value
    let mut cursor = node.walk();
    let children: Vec<_> = node
        .children(&mut cursor)
        .filter(|c| c.kind() != ":")
        .collect();

    if children.len() >= 2 {
        return format!(
            "{}: {}",
            format_expression(children[0], ctx),
            format_expression(children[1], ctx)
        );
    }

    ctx.node_text(node).to_string()
}

fn format_binary_operation(node: Node<'_>, ctx: &Context<'_>) -> String {
    let left = node.child_by_field_name("left");
    let right = node.child_by_field_name("right");
    let operator = node.child_by_field_name("operator");

    if let (Some(l), Some(op), Some(r)) = (left, operator, right) {
        return format!(
            "{} {} {}",
            format_expression(l, ctx),
            ctx.node_text(op),
            format_expression(r, ctx)
        );
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    // "not in" and "is not" are two keyword tokens
    if children.len() == 4 && children[1].kind() == "not" && children[2].kind() == "in" {
        return format!(
            "{} not in {}",
            format_expression(children[0], ctx),
            format_expression(children[3], ctx)
        );
    }
    if children.len() == 4 && children[1].kind() == "is" && children[2].kind() == "not" {
        return format!(
            "{} is not {}",
            format_expression(children[0], ctx),
            format_expression(children[3], ctx)
        );
    }

    if children.len() >= 3 {
        return format!(
            "{} {} {}",
            format_expression(children[0], ctx),
            ctx.node_text(children[1]).trim(),
            format_expression(children[2], ctx)
        );
    }

    ctx.node_text(node).to_string()
}

fn format_unary_operation(node: Node<'_>, ctx: &Context<'_>) -> String {
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();

    if children.len() >= 2 {
        let op = ctx.node_text(children[0]);
        let operand = format_expression(children[1], ctx);
        // "not" needs a space, "-" and "~" don't
        if op == "not" || op == "!" {
            format!("not {}", operand)
        } else {
            format!("{}{}", op, operand)
        }
    } else {
        ctx.node_text(node).to_string()
    }
}

fn format_comparison(node: Node<'_>, ctx: &Context<'_>) -> String {
    // Comparisons can be chained: a < b < c
    let mut cursor = node.walk();
    let parts: Vec<String> = node
        .children(&mut cursor)
        .enumerate()
        .map(|(i, child)| {
            if i % 2 == 0 {
                format_expression(child, ctx)
            } else {
                ctx.node_text(child).to_string()
            }
        })
        .collect();
    parts.join(" ")
}

fn format_boolean_operation(node: Node<'_>, ctx: &Context<'_>) -> String {
    let left = node.child_by_field_name("left");
    let right = node.child_by_field_name("right");
    let operator = node.child_by_field_name("operator");

    match (left, operator, right) {
        (Some(l), Some(op), Some(r)) => {
            let op_text = match ctx.node_text(op) {
                "&&" => "and",
                "||" => "or",
                other => other,
            };
            format!(
                "{} {} {}",
                format_expression(l, ctx),
                op_text,
                format_expression(r, ctx)
            )
        }
        _ => ctx.node_text(node).to_string(),
    }
}

fn format_call(node: Node<'_>, ctx: &Context<'_>) -> String {
    let Some((function, arguments)) = call_parts(node) else {
        return ctx.node_text(node).to_string();
    };

    let func_text = format_expression(function, ctx);
    let args: Vec<String> = arguments
        .map(|a| {
            container_elements(a)
                .iter()
                .map(|c| format_expression(*c, ctx))
                .collect()
        })
        .unwrap_or_default();

    format!("{}({})", func_text, args.join(", "))
}

fn format_attribute(node: Node<'_>, ctx: &Context<'_>) -> String {
    match (
        node.child_by_field_name("object"),
        node.child_by_field_name("attribute"),
    ) {
        (Some(obj), Some(attr)) => {
            format!("{}.{}", format_expression(obj, ctx), ctx.node_text(attr))
        }
        _ => ctx.node_text(node).to_string(),
    }
}

fn format_subscript(node: Node<'_>, ctx: &Context<'_>) -> String {
    match (
        node.child_by_field_name("value"),
        node.child_by_field_name("subscript"),
    ) {
        (Some(value), Some(subscript)) => format!(
            "{}[{}]",
            format_expression(value, ctx),
            format_expression(subscript, ctx)
        ),
        _ => ctx.node_text(node).to_string(),
    }
}

fn format_array(node: Node<'_>, ctx: &Context<'_>) -> String {
    let elements = container_elements(node);
    if elements.is_empty() {
        return "[]".to_string();
    }
    let rendered: Vec<String> = elements.iter().map(|c| format_expression(*c, ctx)).collect();
    format!("[{}]", rendered.join(", "))
}

fn format_dictionary(node: Node<'_>, ctx: &Context<'_>) -> String {
    let entries = container_elements(node);
    if entries.is_empty() {
        return "{}".to_string();
    }
    let rendered: Vec<String> = entries.iter().map(|c| format_pair(*c, ctx)).collect();
    format!("{{ {} }}", rendered.join(", "))
}

fn format_parenthesized(node: Node<'_>, ctx: &Context<'_>) -> String {
    match parenthesized_inner(node) {
        Some(inner) => format!("({})", format_expression(inner, ctx)),
        None => ctx.node_text(node).to_string(),
    }
}

fn format_assignment(node: Node<'_>, ctx: &Context<'_>) -> String {
    match (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) {
        (Some(l), Some(r)) => format!(
            "{} = {}",
            format_expression(l, ctx),
            format_expression(r, ctx)
        ),
        _ => ctx.node_text(node).to_string(),
    }
}

fn format_augmented_assignment(node: Node<'_>, ctx: &Context<'_>) -> String {
    match (
        node.child_by_field_name("left"),
        node.child_by_field_name("operator"),
        node.child_by_field_name("right"),
    ) {
        (Some(l), Some(op), Some(r)) => format!(
            "{} {} {}",
            format_expression(l, ctx),
            ctx.node_text(op),
            format_expression(r, ctx)
        ),
        _ => ctx.node_text(node).to_string(),
    }
}

fn format_ternary(node: Node<'_>, ctx: &Context<'_>) -> String {
    let true_val = node.child_by_field_name("true");
    let condition = node.child_by_field_name("condition");
    let false_val = node.child_by_field_name("false");

    if let (Some(t), Some(c), Some(f)) = (true_val, condition, false_val) {
        return format!(
            "{} if {} else {}",
            format_expression(t, ctx),
            format_expression(c, ctx),
            format_expression(f, ctx)
        );
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    if children.len() >= 5 {
        return format!(
            "{} if {} else {}",
            format_expression(children[0], ctx),
            format_expression(children[2], ctx),
            format_expression(children[4], ctx)
        );
    }

    ctx.node_text(node).to_string()
}

fn format_cast(node: Node<'_>, ctx: &Context<'_>) -> String {
    match (
        node.child_by_field_name("value"),
        node.child_by_field_name("type"),
    ) {
        (Some(value), Some(ty)) => {
            format!("{} as {}", format_expression(value, ctx), ctx.node_text(ty))
        }
        _ => ctx.node_text(node).to_string(),
    }
}

fn format_await(node: Node<'_>, ctx: &Context<'_>) -> String {
    let mut cursor = node.walk();
    let operand = node.children(&mut cursor).find(|c| c.kind() != "await");
    match operand {
        Some(expr) => format!("await {}", format_expression(expr, ctx)),
        None => ctx.node_text(node).to_string(),
    }
}
