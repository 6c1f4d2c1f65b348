// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs alongside it; only cross-cutting instructions live here.

/// System prompt for replies that must be a single bare number.
pub const NUMBER_ONLY_SYSTEM: &str = "\
You are a precise counting assistant. \
Respond with a single non-negative integer and nothing else.";

/// Fills `{name}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so text that happens to contain
/// `{resume}` stays literal. Unknown placeholders are left as written.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
