//! block-structured text emission
//!
//! [render] is a pure function of the reconstructed tree: fields print in
//! the tree's own order with four spaces of indent per nesting level, and
//! nothing here mutates or re-sorts the input.
use crate::resource::{Field, List, Resource, Scalar};

const INDENT: &str = "    ";

/// Render one resource as a `resource "type" "name" { ... }` block
pub fn render(resource: &Resource) -> String {
    let mut renderer = Renderer::default();
    renderer.line(&format!(
        "resource \"{}\" \"{}\" {{",
        resource.resource_type, resource.name
    ));
    renderer.indent = 1;
    renderer.fields(&resource.fields);
    renderer.indent = 0;
    renderer.line("}");
    renderer.out
}

#[derive(Default)]
struct Renderer {
    out: String,
    indent: usize,
}

impl Renderer {
    fn fields(&mut self, fields: &[Field]) {
        for field in fields {
            self.field(field);
        }
    }

    fn field(&mut self, field: &Field) {
        match field {
            Field::Scalar(scalar) => self.scalar(scalar),
            Field::Map(map) => self.block(&map.key, &map.children),
            Field::List(list) => self.list(list),
            Field::Nested(_) => unreachable!("nested objects only occur as list elements"),
        }
    }

    fn scalar(&mut self, scalar: &Scalar) {
        if scalar.computed {
            return;
        }

        let key = quote_key(&scalar.key);

        // reference fields never print their literal value
        if let Some(link) = &scalar.link {
            self.line(&format!("{key} = \"${{{link}}}\""));
            return;
        }

        if scalar.is_bool {
            self.line(&format!("{key} = {}", scalar.value));
            return;
        }

        // embedded documents (JSON policies and the like) go out as
        // heredocs; literal `${` must become `&{` so the target format does
        // not read it as its own interpolation syntax
        if scalar.value.starts_with('{') {
            self.push_indent();
            self.out.push_str(&key);
            self.out.push_str(" = <<EOF\n");
            self.out.push_str(&scalar.value.replace("${", "&{"));
            self.out.push_str("\nEOF\n");
            return;
        }

        // an explicitly empty attribute is indistinguishable from an absent
        // one in the output contract
        if scalar.value.is_empty() {
            return;
        }

        self.line(&format!("{key} = \"{}\"", escape(&scalar.value)));
    }

    fn list(&mut self, list: &List) {
        match list.children.first() {
            Some(Field::Scalar(_)) => {
                self.line(&format!("{} = [", quote_key(&list.key)));
                self.indent += 1;
                for element in &list.children {
                    let Field::Scalar(scalar) = element else {
                        unreachable!("list children must be all scalars or all nested objects");
                    };
                    self.line(&format!("\"{}\",", escape(&scalar.value)));
                }
                self.indent -= 1;
                self.line("]");
            }
            Some(Field::Nested(_)) => {
                for (position, element) in list.children.iter().enumerate() {
                    let Field::Nested(nested) = element else {
                        unreachable!("list children must be all scalars or all nested objects");
                    };
                    if position > 0 {
                        self.out.push('\n');
                    }
                    self.block(&list.key, &nested.children);
                }
            }
            Some(_) => unreachable!("list children must be scalars or nested objects"),
            None => unreachable!("lists are never reconstructed empty"),
        }
    }

    fn block(&mut self, key: &str, children: &[Field]) {
        self.line(&format!("{key} {{"));
        self.indent += 1;
        self.fields(children);
        self.indent -= 1;
        self.line("}");
    }

    fn line(&mut self, text: &str) {
        self.push_indent();
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }
}

fn quote_key(key: &str) -> String {
    if key.contains('/') {
        format!("\"{key}\"")
    } else {
        key.to_string()
    }
}

fn escape(value: &str) -> String {
    value.replace('"', "\\\"")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resource::{Map, Nested, OrderedFields};
    use pretty_assertions::assert_eq;

    fn resource(fields: OrderedFields) -> Resource {
        Resource::new("aws_instance", "web", fields)
    }

    fn scalar(key: &str, value: &str) -> Scalar {
        Scalar::new(key, key, value)
    }

    #[test]
    fn plain_scalar() {
        let text = render(&resource(vec![Field::Scalar(scalar("ami", "ami-123456"))]));
        assert_eq!(
            text,
            "resource \"aws_instance\" \"web\" {\n    ami = \"ami-123456\"\n}\n"
        );
    }

    #[test]
    fn computed_scalar_is_suppressed() {
        let mut id = scalar("id", "i-1234");
        id.computed = true;

        let text = render(&resource(vec![Field::Scalar(id)]));
        assert_eq!(text, "resource \"aws_instance\" \"web\" {\n}\n");
    }

    #[test]
    fn empty_scalar_is_suppressed() {
        let text = render(&resource(vec![Field::Scalar(scalar("foo", ""))]));
        assert_eq!(text, "resource \"aws_instance\" \"web\" {\n}\n");
    }

    #[test]
    fn link_wins_over_literal_value() {
        let mut group = scalar("security_group", "sg-123456");
        group.link = Some("aws_security_group.default.id".to_string());

        let text = render(&resource(vec![Field::Scalar(group)]));
        assert_eq!(
            text,
            "resource \"aws_instance\" \"web\" {\n    security_group = \"${aws_security_group.default.id}\"\n}\n"
        );
    }

    #[test]
    fn bool_flagged_scalar_prints_bare() {
        let mut monitoring = scalar("monitoring", "true");
        monitoring.is_bool = true;

        let text = render(&resource(vec![Field::Scalar(monitoring)]));
        assert_eq!(
            text,
            "resource \"aws_instance\" \"web\" {\n    monitoring = true\n}\n"
        );
    }

    #[test]
    fn embedded_document_becomes_a_heredoc() {
        let policy = scalar("policy", "{\"ref\":\"${aws.thing}\"}");

        let text = render(&resource(vec![Field::Scalar(policy)]));
        assert_eq!(
            text,
            "resource \"aws_instance\" \"web\" {\n    policy = <<EOF\n{\"ref\":\"&{aws.thing}\"}\nEOF\n}\n"
        );
    }

    #[test]
    fn quotes_are_escaped_and_slash_keys_quoted() {
        let text = render(&resource(vec![Field::Map(Map {
            key: "tags".to_string(),
            path: "tags.%".to_string(),
            children: vec![Field::Scalar(scalar("kubernetes.io/cluster", "say \"hi\""))],
        })]));
        assert_eq!(
            text,
            "resource \"aws_instance\" \"web\" {\n    tags {\n        \"kubernetes.io/cluster\" = \"say \\\"hi\\\"\"\n    }\n}\n"
        );
    }

    #[test]
    fn scalar_list_prints_one_element_per_line() {
        let text = render(&resource(vec![Field::List(List {
            key: "groups".to_string(),
            path: "groups.#".to_string(),
            children: vec![
                Field::Scalar(scalar("A", "default")),
                Field::Scalar(scalar("B", "admin")),
            ],
        })]));
        assert_eq!(
            text,
            "resource \"aws_instance\" \"web\" {\n    groups = [\n        \"default\",\n        \"admin\",\n    ]\n}\n"
        );
    }

    #[test]
    fn rich_list_blocks_are_separated_by_one_blank_line() {
        let text = render(&resource(vec![Field::List(List {
            key: "ingress".to_string(),
            path: "ingress.#".to_string(),
            children: vec![
                Field::Nested(Nested {
                    path: "ingress.A.from_port".to_string(),
                    children: vec![Field::Scalar(scalar("from_port", "80"))],
                }),
                Field::Nested(Nested {
                    path: "ingress.B.from_port".to_string(),
                    children: vec![Field::Scalar(scalar("from_port", "443"))],
                }),
            ],
        })]));
        assert_eq!(
            text,
            "resource \"aws_instance\" \"web\" {\n    ingress {\n        from_port = \"80\"\n    }\n\n    ingress {\n        from_port = \"443\"\n    }\n}\n"
        );
    }
}
