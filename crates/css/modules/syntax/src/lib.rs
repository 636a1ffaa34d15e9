//! CSS Syntax Module Level 3: stylesheet and declaration-list parsing.
//! Reference: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Values are kept as raw text; interpretation happens in the consuming
//! modules. Rules nested in `@media` and `@supports` are flattened and tagged
//! with their condition; every other at-rule is skipped.
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name. Lowercased, except custom properties (`--*`) which are
    /// case-sensitive and kept verbatim.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

impl Declaration {
    pub fn is_custom_property(&self) -> bool {
        self.name.starts_with("--")
    }
}

/// Grouping condition a rule was nested in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleCondition {
    /// `@media <query>`; the raw query text.
    Media(String),
    /// `@supports <condition>`; the raw condition text.
    Supports(String),
}

/// A single style rule with a raw prelude and parsed declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (typically the selector list).
    pub prelude: String,
    /// Declarations within the rule block.
    pub declarations: Vec<Declaration>,
    /// Enclosing conditional group, `None` for top-level rules.
    pub condition: Option<RuleCondition>,
}

/// A parsed stylesheet consisting of style rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Style rules in source order.
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Rules declared directly at the top level of the sheet.
    pub fn top_level_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter(|rule| rule.condition.is_none())
    }
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind('!')
        && let Some(flag) = trimmed.get(pos + 1..)
        && flag.trim().eq_ignore_ascii_case("important")
        && let Some(prefix) = trimmed.get(..pos)
    {
        return (prefix.trim_end().to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

fn normalize_property_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_owned()
    } else {
        name.to_ascii_lowercase()
    }
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl CssDeclarationParser<'_> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let (value, important) = split_important_tail(input.slice_from(start));
        Ok(Declaration {
            name: normalize_property_name(&name),
            value,
            important,
        })
    }
}

impl CssAtRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();

    fn parse_prelude<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)))
    }
}

impl CssQualifiedRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();

    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl CssRuleBodyItemParser<'_, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Prelude of a supported grouping at-rule; `None` marks one we skip.
type GroupPrelude = Option<RuleCondition>;

/// Stylesheet-level parser. Produces a batch of rules per item so grouping
/// at-rules can contribute all of their nested rules at once.
struct TopLevelParser {
    condition: Option<RuleCondition>,
}

fn consume_raw(input: &mut Parser<'_, '_>) -> String {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim().to_owned()
}

impl CssAtRuleParser<'_> for TopLevelParser {
    type Prelude = GroupPrelude;
    type AtRule = Vec<StyleRule>;
    type Error = ();

    fn parse_prelude<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let text = consume_raw(input);
        let condition = if name.eq_ignore_ascii_case("media") {
            Some(RuleCondition::Media(text))
        } else if name.eq_ignore_ascii_case("supports") {
            Some(RuleCondition::Supports(text))
        } else {
            None
        };
        Ok(condition)
    }

    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        let Some(condition) = prelude else {
            return Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid));
        };
        // Nested groups keep the outermost condition.
        let mut nested = TopLevelParser {
            condition: self.condition.clone().or(Some(condition)),
        };
        let mut rules = Vec::new();
        for batch in StyleSheetParser::new(input, &mut nested).flatten() {
            rules.extend(batch);
        }
        Ok(rules)
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Err(())
    }
}

impl CssQualifiedRuleParser<'_> for TopLevelParser {
    type Prelude = String;
    type QualifiedRule = Vec<StyleRule>;
    type Error = ();

    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(consume_raw(input))
    }

    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Ok(vec![StyleRule {
            prelude,
            declarations: parse_declarations_from_block(input),
            condition: self.condition.clone(),
        }])
    }
}

/// Parse declarations from a rule block using `cssparser` body parser.
fn parse_declarations_from_block(block: &mut Parser) -> Vec<Declaration> {
    let mut body = BodyDeclParser;
    CssRuleBodyParser::new(block, &mut body).flatten().collect()
}

/// Parse a full stylesheet into a `Stylesheet` using cssparser.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevelParser { condition: None };
    let mut sheet = Stylesheet::default();
    for batch in StyleSheetParser::new(&mut parser, &mut top).flatten() {
        sheet.rules.extend(batch);
    }
    sheet
}

/// Parse a bare declaration list such as the contents of a `style` attribute.
pub fn parse_declaration_list(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_declarations_from_block(&mut parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_and_important() {
        let sheet = parse_stylesheet(".a, .b { color: red !important; Margin: 0 }");
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.prelude, ".a, .b");
        assert_eq!(rule.declarations[0].name, "color");
        assert_eq!(rule.declarations[0].value, "red");
        assert!(rule.declarations[0].important);
        assert_eq!(rule.declarations[1].name, "margin");
        assert!(!rule.declarations[1].important);
    }

    #[test]
    fn custom_property_names_keep_case() {
        let decls = parse_declaration_list("--Brand-Color: #FF0000; COLOR: var(--Brand-Color)");
        assert_eq!(decls[0].name, "--Brand-Color");
        assert!(decls[0].is_custom_property());
        assert_eq!(decls[1].name, "color");
        assert_eq!(decls[1].value, "var(--Brand-Color)");
    }

    #[test]
    fn media_rules_are_flattened_with_condition() {
        let sheet = parse_stylesheet(
            "@import url(x.css); :root { --a: #fff } @media (max-width: 600px) { p { color: blue } } @font-face { font-family: x }",
        );
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.top_level_rules().count(), 1);
        assert_eq!(
            sheet.rules[1].condition,
            Some(RuleCondition::Media("(max-width: 600px)".to_owned()))
        );
    }
}
