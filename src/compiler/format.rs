//! Deterministic re-indentation pass over a parsed C# syntax tree (§9
//! "Formatting"), generalized from the teacher's IR pretty-printer
//! (`ir/transforms/pretty_printer`) to tree-sitter leaf tokens: rather than
//! visiting typed AST nodes, this walks the token stream once and reconstructs
//! Allman-style brace placement and indentation from punctuation alone. It
//! does not reflow comments or string/char literal contents.

const INDENT_UNIT: &str = "    ";

/// No-space-before tokens: punctuation that hugs whatever precedes it.
fn hugs_previous(token: &str) -> bool {
    matches!(token, ";" | "," | ")" | "]" | "." | "::" | "++" | "--")
}

/// No-space-after tokens: punctuation that hugs whatever follows it.
fn hugs_next(token: &str) -> bool {
    matches!(token, "(" | "[" | "." | "::" | "!")
}

pub fn format_source(text: &str) -> String {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
        .expect("tree-sitter-c-sharp grammar failed to load");
    let Some(tree) = parser.parse(text, None) else {
        return text.to_string();
    };

    let mut tokens = Vec::new();
    collect_leaves(tree.root_node(), text, &mut tokens);
    if tokens.is_empty() {
        return text.to_string();
    }

    render(&tokens)
}

struct Leaf<'a> {
    kind: &'a str,
    text: &'a str,
}

fn collect_leaves<'a>(node: tree_sitter::Node, text: &'a str, out: &mut Vec<Leaf<'a>>) {
    if node.child_count() == 0 {
        if let Ok(s) = node.utf8_text(text.as_bytes()) {
            if !s.trim().is_empty() || node.kind() == "comment" {
                out.push(Leaf {
                    kind: node.kind(),
                    text: s,
                });
            }
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_leaves(child, text, out);
    }
}

fn render(tokens: &[Leaf]) -> String {
    let mut out = String::new();
    let mut indent: usize = 0;
    let mut at_line_start = true;

    let push_indent = |out: &mut String, indent: usize| {
        for _ in 0..indent {
            out.push_str(INDENT_UNIT);
        }
    };

    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];

        match tok.text {
            "{" => {
                if !at_line_start {
                    out.push('\n');
                }
                push_indent(&mut out, indent);
                out.push('{');
                out.push('\n');
                indent += 1;
                at_line_start = true;
            }
            "}" => {
                indent = indent.saturating_sub(1);
                if !at_line_start {
                    out.push('\n');
                }
                push_indent(&mut out, indent);
                out.push('}');
                let next_hugs = tokens.get(i + 1).is_some_and(|n| hugs_previous(n.text));
                if !next_hugs {
                    out.push('\n');
                    at_line_start = true;
                } else {
                    at_line_start = false;
                }
            }
            ";" => {
                out.push(';');
                out.push('\n');
                at_line_start = true;
            }
            _ => {
                if at_line_start {
                    push_indent(&mut out, indent);
                } else if !hugs_previous(tok.text) && !tokens.get(i.wrapping_sub(1)).is_some_and(|p| hugs_next(p.text))
                {
                    out.push(' ');
                }
                if tok.kind == "comment" {
                    out.push_str(tok.text);
                    out.push('\n');
                    at_line_start = true;
                } else {
                    out.push_str(tok.text);
                    at_line_start = false;
                }
            }
        }
        i += 1;
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reindents_braces_allman_style() {
        let input = "class Widget{public void Spin(){}}";
        let formatted = format_source(input);
        assert!(formatted.contains("class Widget\n{\n    public void Spin()\n    {\n    }\n}\n"));
    }

    #[test]
    fn idempotent_on_already_formatted_input() {
        let input = "class Widget\n{\n    public void Spin()\n    {\n    }\n}\n";
        let once = format_source(input);
        let twice = format_source(&once);
        assert_eq!(once, twice);
    }
}
