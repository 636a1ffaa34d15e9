//! CSS selector parsing.
//! Reference: <https://www.w3.org/TR/selectors-3/#grammar>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorList,
    SimpleSelector,
};
use core::iter::Peekable;
use core::str::Chars;

/// User-action and history pseudo-classes that a static page never matches.
const DYNAMIC_PSEUDO_CLASSES: [&str; 10] = [
    "hover",
    "active",
    "focus",
    "focus-visible",
    "focus-within",
    "visited",
    "target",
    "checked",
    "disabled",
    "enabled",
];

/// Character cursor over a selector string.
struct SelectorCursor<'input> {
    chars: Peekable<Chars<'input>>,
}

const fn is_ident_start(character: char) -> bool {
    character.is_ascii_alphabetic()
        || matches!(character, '_' | '-' | '\\')
        || !character.is_ascii()
}

const fn is_ident_char(character: char) -> bool {
    is_ident_start(character) || character.is_ascii_digit()
}

impl<'input> SelectorCursor<'input> {
    fn new(input: &'input str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.chars.next();
            return true;
        }
        false
    }

    /// Skip whitespace, reporting whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let mut saw = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
            saw = true;
        }
        saw
    }

    /// Consume an identifier; backslash escapes take the next character literally.
    fn ident(&mut self) -> Option<String> {
        let mut out = String::new();
        while let Some(character) = self.peek() {
            if !is_ident_char(character) {
                break;
            }
            self.chars.next();
            if character == '\\' {
                out.push(self.chars.next()?);
            } else {
                out.push(character);
            }
        }
        (!out.is_empty()).then_some(out)
    }

    fn quoted(&mut self, quote: char) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                character if character == quote => return Some(out),
                '\\' => out.push(self.chars.next()?),
                character => out.push(character),
            }
        }
    }

    fn compound(&mut self) -> Option<CompoundSelector> {
        let mut simples = Vec::new();
        match self.peek() {
            Some('*') => {
                self.chars.next();
                simples.push(SimpleSelector::Universal);
            }
            Some(character) if is_ident_start(character) => {
                simples.push(SimpleSelector::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.chars.next();
                    simples.push(SimpleSelector::Class(self.ident()?));
                }
                Some('#') => {
                    self.chars.next();
                    simples.push(SimpleSelector::IdSelector(self.ident()?));
                }
                Some('[') => {
                    self.chars.next();
                    simples.push(self.attribute()?);
                }
                Some(':') => {
                    self.chars.next();
                    simples.push(SimpleSelector::PseudoClass(self.pseudo_class()?));
                }
                _ => break,
            }
        }
        (!simples.is_empty()).then_some(CompoundSelector { simples })
    }

    fn attribute(&mut self) -> Option<SimpleSelector> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let operator = match self.chars.next()? {
            ']' => {
                return Some(SimpleSelector::Attribute {
                    name,
                    operator: AttrOperator::Exists,
                    value: String::new(),
                    case_insensitive: false,
                });
            }
            '=' => AttrOperator::Equals,
            prefix => {
                let operator = match prefix {
                    '~' => AttrOperator::Includes,
                    '|' => AttrOperator::DashMatch,
                    '^' => AttrOperator::Prefix,
                    '$' => AttrOperator::Suffix,
                    '*' => AttrOperator::Substring,
                    _ => return None,
                };
                if !self.eat('=') {
                    return None;
                }
                operator
            }
        };
        self.skip_whitespace();
        let value = match self.peek()? {
            quote @ ('"' | '\'') => {
                self.chars.next();
                self.quoted(quote)?
            }
            _ => self.ident()?,
        };
        self.skip_whitespace();
        let case_insensitive = self.eat('i') || self.eat('I');
        self.skip_whitespace();
        if !self.eat(']') {
            return None;
        }
        Some(SimpleSelector::Attribute {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn pseudo_class(&mut self) -> Option<PseudoClass> {
        // Pseudo-elements never match an element.
        if self.peek() == Some(':') {
            return None;
        }
        let name = self.ident()?.to_ascii_lowercase();
        if self.eat('(') {
            if name != "not" {
                return None;
            }
            self.skip_whitespace();
            let inner = self.compound()?;
            self.skip_whitespace();
            return self
                .eat(')')
                .then(|| PseudoClass::Not(Box::new(inner)));
        }
        match name.as_str() {
            "root" => Some(PseudoClass::Root),
            "first-child" => Some(PseudoClass::FirstChild),
            "last-child" => Some(PseudoClass::LastChild),
            "only-child" => Some(PseudoClass::OnlyChild),
            "empty" => Some(PseudoClass::Empty),
            "link" | "any-link" => Some(PseudoClass::Link),
            other if DYNAMIC_PSEUDO_CLASSES.contains(&other) => {
                Some(PseudoClass::Dynamic(other.to_owned()))
            }
            _ => None,
        }
    }
}

/// Parse a selector list from CSS text. Returns `None` if any selector in the
/// list is invalid, matching how a rule with an invalid selector is dropped.
pub fn parse_selector_list(input: &str) -> Option<SelectorList> {
    let mut list = SelectorList::default();
    for part in split_top_level_commas(input) {
        list.selectors.push(parse_complex_selector(part)?);
    }
    (!list.selectors.is_empty()).then_some(list)
}

/// Split on commas that are not nested in brackets, parentheses or quotes.
fn split_top_level_commas(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (index, character) in input.char_indices() {
        match (quote, character) {
            (Some(open), current) if current == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(character),
            (None, '(' | '[') => depth = depth.saturating_add(1),
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(input.get(start..index).unwrap_or_default());
                start = index.saturating_add(1);
            }
            _ => {}
        }
    }
    parts.push(input.get(start..).unwrap_or_default());
    parts
}

/// Parse one complex selector; `None` when it is empty or malformed.
pub fn parse_complex_selector(input: &str) -> Option<ComplexSelector> {
    let mut cursor = SelectorCursor::new(input.trim());
    let first = cursor.compound()?;
    let mut rest = Vec::new();
    loop {
        let saw_whitespace = cursor.skip_whitespace();
        let combinator = match cursor.peek() {
            None => break,
            Some('>') => Combinator::Child,
            Some('+') => Combinator::AdjacentSibling,
            Some('~') => Combinator::GeneralSibling,
            Some(_) if saw_whitespace => Combinator::Descendant,
            Some(_) => return None,
        };
        if combinator != Combinator::Descendant {
            cursor.chars.next();
            cursor.skip_whitespace();
        }
        rest.push((combinator, cursor.compound()?));
    }
    Some(ComplexSelector { first, rest })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_keep_case_and_types_lowercase() {
        let Some(sel) = parse_complex_selector("DIV.Card#Main") else {
            panic!("selector should parse");
        };
        assert_eq!(
            sel.first.simples,
            vec![
                SimpleSelector::Type("div".to_owned()),
                SimpleSelector::Class("Card".to_owned()),
                SimpleSelector::IdSelector("Main".to_owned()),
            ]
        );
    }

    #[test]
    fn combinators_and_lists() {
        let Some(list) = parse_selector_list("nav > a + b ~ i em, [data-x^=\"a,b\"]") else {
            panic!("list should parse");
        };
        assert_eq!(list.selectors.len(), 2);
        let combinators: Vec<Combinator> =
            list.selectors[0].rest.iter().map(|(comb, _)| *comb).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Child,
                Combinator::AdjacentSibling,
                Combinator::GeneralSibling,
                Combinator::Descendant,
            ]
        );
    }

    #[test]
    fn unsupported_syntax_is_rejected_without_looping() {
        assert!(parse_complex_selector("p::before").is_none());
        assert!(parse_complex_selector("li:nth-child(2)").is_none());
        assert!(parse_complex_selector("a ( b").is_none());
        assert!(parse_selector_list("a, ").is_none());
        assert!(parse_complex_selector("a:hover").is_some());
    }
}
