use super::{Field, SchemaNode};
use serde_json::{json, Map, Value};

const INDENT: &str = "  ";

/// 渲染成写进提示词的 JSON 模板
///
/// 字符串叶子写成 `"示例 (说明)"`，数字叶子写成示例值并附 `//` 注释，
/// 只给模型看，不是合法 JSON。
pub fn to_prompt_template(node: &SchemaNode) -> String {
    let mut out = String::new();
    render_node(node, 0, &mut out);
    out
}

fn render_node(node: &SchemaNode, depth: usize, out: &mut String) {
    match node {
        SchemaNode::Object(fields) => render_object(fields, depth, out),
        SchemaNode::Array { items, note, .. } => match items.as_ref() {
            SchemaNode::Object(_) | SchemaNode::Array { .. } => {
                out.push_str("[\n");
                out.push_str(&INDENT.repeat(depth + 1));
                render_node(items, depth + 1, out);
                out.push('\n');
                out.push_str(&INDENT.repeat(depth + 1));
                out.push_str("// ");
                out.push_str(note);
                out.push('\n');
                out.push_str(&INDENT.repeat(depth));
                out.push(']');
            }
            scalar => {
                out.push('[');
                render_node(scalar, depth, out);
                out.push_str(", ...]");
            }
        },
        SchemaNode::String {
            example,
            description,
        } => {
            out.push_str(&format!("\"{} ({})\"", example, description));
        }
        SchemaNode::Number { example, .. } => out.push_str(&example.to_string()),
    }
}

fn render_object(fields: &[Field], depth: usize, out: &mut String) {
    out.push_str("{\n");
    for (i, field) in fields.iter().enumerate() {
        out.push_str(&INDENT.repeat(depth + 1));
        out.push_str(&format!("\"{}\": ", field.name));
        render_node(&field.node, depth + 1, out);
        if i + 1 < fields.len() {
            out.push(',');
        }
        match &field.node {
            SchemaNode::Number { description, .. } => {
                out.push_str(" // ");
                out.push_str(description);
            }
            SchemaNode::Array { items, note, .. } if !matches!(items.as_ref(), SchemaNode::Object(_)) => {
                out.push_str(" // ");
                out.push_str(note);
            }
            _ => {}
        }
        out.push('\n');
    }
    out.push_str(&INDENT.repeat(depth));
    out.push('}');
}

/// 转换为 Gemini 的 responseSchema（OpenAPI 子集，类型名大写）
pub fn to_response_schema(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Object(fields) => {
            let mut properties = Map::new();
            for field in fields {
                properties.insert(field.name.to_string(), to_response_schema(&field.node));
            }
            let required: Vec<&str> = fields.iter().map(|f| f.name).collect();
            json!({
                "type": "OBJECT",
                "properties": properties,
                "required": required,
                "propertyOrdering": required,
            })
        }
        SchemaNode::Array { items, count, note } => {
            let mut schema = json!({
                "type": "ARRAY",
                "description": note,
                "items": to_response_schema(items),
            });
            if let Some(count) = count {
                schema["minItems"] = json!(count);
                schema["maxItems"] = json!(count);
            }
            schema
        }
        SchemaNode::String { description, .. } => json!({
            "type": "STRING",
            "description": description,
        }),
        SchemaNode::Number {
            description, range, ..
        } => {
            let mut schema = json!({
                "type": "NUMBER",
                "description": description,
            });
            if let Some((min, max)) = range {
                schema["minimum"] = json!(min);
                schema["maximum"] = json!(max);
            }
            schema
        }
    }
}
