//! The live render pipeline.
//!
//! Pure functions from (template text, context text) to rendered output,
//! delegating parsing/compiling/execution to minijinja. The app calls
//! [`render_template`] after every change batch to either input and folds
//! the result into [`OutputState`].

pub mod format;

use minijinja::{Environment, UndefinedBehavior};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("context is not valid JSON: {0}")]
    Context(#[from] serde_json::Error),
    #[error("{0}")]
    Template(#[from] minijinja::Error),
}

/// Environment the playground renders with. Strict undefined behavior so a
/// missing variable is an error instead of a silent empty string, and
/// trim/lstrip blocks per the conventions chat templates are written
/// against (this is also what keeps formatted templates rendering
/// identically, see [`format`]).
pub fn playground_env<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env
}

/// Parse the context as JSON, compile the template, render one against the
/// other. Deterministic for fixed inputs.
pub fn render_template(template: &str, context: &str) -> Result<String, RenderError> {
    let context: serde_json::Value = serde_json::from_str(context)?;
    let env = playground_env();
    let compiled = env.template_from_str(template)?;
    Ok(compiled.render(&context)?)
}

/// Render outcome shown in the output pane. Exactly one of "the text is
/// current" and "an error is set" holds; a failed render keeps the last
/// successful text around as stale context instead of clearing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputState {
    Current { text: String },
    Stale { text: String, error: String },
}

impl Default for OutputState {
    fn default() -> Self {
        OutputState::Current {
            text: String::new(),
        }
    }
}

impl OutputState {
    pub fn apply(&mut self, result: Result<String, RenderError>) {
        match result {
            Ok(text) => *self = OutputState::Current { text },
            Err(err) => {
                let text = self.text().to_string();
                *self = OutputState::Stale {
                    text,
                    error: err.to_string(),
                };
            }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            OutputState::Current { text } => text,
            OutputState::Stale { text, .. } => text,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OutputState::Current { .. } => None,
            OutputState::Stale { error, .. } => Some(error),
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, OutputState::Current { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{render_template, OutputState, RenderError};

    #[test]
    fn render_substitutes_variables() {
        let result = render_template("{{ a }}", r#"{"a": "x"}"#).expect("render");
        assert_eq!(result, "x");
    }

    #[test]
    fn render_is_deterministic() {
        let template = "{% for m in messages %}{{ m.role }}:{{ m.content }};{% endfor %}";
        let context = r#"{"messages": [{"role": "user", "content": "hi"}]}"#;
        let first = render_template(template, context).expect("render");
        let second = render_template(template, context).expect("render");
        assert_eq!(first, second);
        assert_eq!(first, "user:hi;");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = render_template("{{ a }}", "{}").expect_err("strict undefined");
        assert!(matches!(err, RenderError::Template(_)));
    }

    #[test]
    fn invalid_context_is_a_context_error() {
        let err = render_template("{{ a }}", "{not json").expect_err("bad json");
        assert!(matches!(err, RenderError::Context(_)));
    }

    #[test]
    fn invalid_template_is_a_template_error() {
        let err = render_template("{% if %}", "{}").expect_err("bad template");
        assert!(matches!(err, RenderError::Template(_)));
    }

    #[test]
    fn trim_blocks_eats_newlines_after_block_tags() {
        let result =
            render_template("{% if x %}\nyes\n{% endif %}", r#"{"x": true}"#).expect("render");
        assert_eq!(result, "yes\n");
    }

    #[test]
    fn failed_render_keeps_previous_output_as_stale() {
        let mut output = OutputState::default();
        output.apply(render_template("{{ a }}", r#"{"a": "x"}"#));
        assert!(output.is_current());
        assert_eq!(output.text(), "x");

        output.apply(render_template("{{ a }}", "{broken"));
        assert!(!output.is_current());
        assert_eq!(output.text(), "x", "previous output must be retained");
        assert!(output.error().is_some());

        output.apply(render_template("{{ a }}", r#"{"a": "y"}"#));
        assert!(output.is_current());
        assert_eq!(output.text(), "y");
        assert!(output.error().is_none());
    }
}
