use std::collections::HashMap;

/// A parsed `{libraryName}` template.
///
/// Substitution operates on a token list instead of successive regex
/// replacements, so a value containing `{other}` can never collide with a
/// later placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Placeholder(String),
}

impl Template {
    /// Parse a template string. Never fails: an unterminated `{` and empty
    /// braces are kept as literal text.
    pub fn parse(source: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            match after_open.find('}') {
                Some(close) if close > 0 => {
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Placeholder(after_open[..close].to_string()));
                    rest = &after_open[close + 1..];
                }
                Some(close) => {
                    // Empty braces stay literal.
                    literal.push_str("{}");
                    rest = &after_open[close + 1..];
                }
                None => {
                    literal.push('{');
                    rest = after_open;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Self { tokens }
    }

    /// Placeholder names in appearance order, duplicates included.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Placeholder(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    /// Substitute placeholders present in `values`; the rest are stripped.
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut output = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => output.push_str(text),
                Token::Placeholder(name) => {
                    if let Some(value) = values.get(name) {
                        output.push_str(value);
                    }
                }
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)|(name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_placeholders() {
        let template = Template::parse("一幅{风格}的{场景}画");
        let rendered = template.render(&values(&[("风格", "水彩"), ("场景", "森林")]));
        assert_eq!(rendered, "一幅水彩的森林画");
    }

    #[test]
    fn strips_unmatched_placeholders() {
        let template = Template::parse("{场景} in {未知} style");
        let rendered = template.render(&values(&[("场景", "海边")]));
        assert_eq!(rendered, "海边 in  style");
    }

    #[test]
    fn value_containing_braces_does_not_collide() {
        let template = Template::parse("{a}{b}");
        let rendered = template.render(&values(&[("a", "{b}"), ("b", "x")]));
        assert_eq!(rendered, "{b}x");
    }

    #[test]
    fn unterminated_brace_is_literal() {
        let template = Template::parse("开头{场景");
        assert_eq!(template.render(&HashMap::new()), "开头{场景");
        assert_eq!(template.placeholders().count(), 0);
    }

    #[test]
    fn repeated_placeholder_substitutes_every_occurrence() {
        let template = Template::parse("{x}-{x}");
        assert_eq!(template.render(&values(&[("x", "a")])), "a-a");
    }
}
