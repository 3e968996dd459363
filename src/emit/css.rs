//! CSS block rendering.

use minijinja::{context, Environment, Error};
use serde::Serialize;

const TEMPLATE_NAME: &str = "variables.css";

// Blocks are separated by one blank line; every block ends with a newline.
const TEMPLATE: &str = "{% for block in blocks %}{% if not loop.first %}\n{% endif %}\
{{ block.selector }} {\n\
{% for decl in block.declarations %}  {{ decl.name }}: {{ decl.value }};\n{% endfor %}\
}\n\
{% endfor %}";

/// One `name: value;` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Full custom property name, including the leading `--`.
    pub name: String,
    pub value: String,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A selector with its declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssBlock {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl CssBlock {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.declarations.push(Declaration::new(name, value));
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Renders [`CssBlock`]s to stylesheet text.
///
/// The template is compiled once per renderer and reused for every render.
pub struct CssRenderer {
    env: Environment<'static>,
}

impl CssRenderer {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, blocks: &[CssBlock]) -> Result<String, Error> {
        let tmpl = self.env.get_template(TEMPLATE_NAME)?;
        tmpl.render(context! { blocks => blocks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_block() {
        let mut root = CssBlock::new(":root");
        root.push("--a", "#112233");
        root.push("--b", "var(--a)");

        let css = CssRenderer::new().unwrap().render(&[root]).unwrap();
        assert_eq!(css, ":root {\n  --a: #112233;\n  --b: var(--a);\n}\n");
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let mut root = CssBlock::new(":root");
        root.push("--a", "1");
        let mut scoped = CssBlock::new(r#"[data-theme="light"]"#);
        scoped.push("--b", "var(--a)");

        let css = CssRenderer::new()
            .unwrap()
            .render(&[root, scoped])
            .unwrap();
        assert_eq!(
            css,
            ":root {\n  --a: 1;\n}\n\n[data-theme=\"light\"] {\n  --b: var(--a);\n}\n"
        );
    }

    #[test]
    fn test_values_are_not_escaped() {
        let mut root = CssBlock::new(":root");
        root.push("--font", "\"JetBrains Mono\", monospace");
        let css = CssRenderer::new().unwrap().render(&[root]).unwrap();
        assert!(css.contains("--font: \"JetBrains Mono\", monospace;"));
    }

    #[test]
    fn test_empty_input() {
        let css = CssRenderer::new().unwrap().render(&[]).unwrap();
        assert_eq!(css, "");
    }
}
