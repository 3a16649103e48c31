use serde_json::Value;

/// Every scalar in `root` with its JSON pointer, in document order.
/// Empty objects and arrays contribute nothing. A scalar root is `"/"`.
pub(crate) fn leaves(root: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), root)];

    while let Some((ptr, v)) = stack.pop() {
        match v {
            // pushed in reverse so the first child is popped first
            Value::Object(map) => stack.extend(
                map.iter()
                    .rev()
                    .map(|(k, child)| (format!("{ptr}/{}", escape(k)), child)),
            ),
            Value::Array(items) => stack.extend(
                items
                    .iter()
                    .enumerate()
                    .rev()
                    .map(|(i, child)| (format!("{ptr}/{i}"), child)),
            ),
            _ if ptr.is_empty() => out.push(("/".to_string(), v)),
            _ => out.push((ptr, v)),
        }
    }
    out
}

/// RFC 6901 token escaping.
fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
