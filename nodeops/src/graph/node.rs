use super::{AttrValue, Graph, Node};

/// One-line rendering of a node for traces and error messages.
pub fn describe_node(graph: &Graph, node: &Node) -> String {
    let inputs = tensor_names(graph, &node.inputs);
    let outputs = tensor_names(graph, &node.outputs);
    if node.attrs.items.is_empty() {
        return format!("{} op {}({}) >> {}", node.name, node.op, inputs, outputs);
    }
    let attrs = node
        .attrs
        .items
        .iter()
        .map(|attr| format!("{}={}", attr.name, format_attr(&attr.value)))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{} op {}({}) [{}] >> {}",
        node.name, node.op, inputs, attrs, outputs
    )
}

fn tensor_names(graph: &Graph, ids: &[usize]) -> String {
    ids.iter()
        .map(|id| match graph.get_tensor(*id) {
            Ok(tensor) => tensor.name().to_string(),
            Err(_) => format!("#{}", id),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn format_attr(value: &AttrValue) -> String {
    match value {
        AttrValue::Int(v) => v.to_string(),
        AttrValue::Float(v) => v.to_string(),
        AttrValue::Bool(v) => v.to_string(),
        AttrValue::Str(v) => v.clone(),
    }
}
