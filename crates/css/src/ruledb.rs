use css_cascade::Origin;
use css_selectors::{
    ComplexSelector, SimpleSelector, Specificity, parse_selector_list, specificity_of_complex,
};
use css_syntax::{Declaration, RuleCondition, Stylesheet};
use log::debug;

/// Cheapest test that can rule a selector out before full matching.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RightmostKey {
    Id(String),
    Class(String),
    Tag(String),
    Universal,
}

#[derive(Clone, Debug)]
pub struct RuleEntry {
    pub origin: Origin,
    pub source_order: u32,
    pub selector: ComplexSelector,
    pub declarations: Vec<Declaration>,
    pub specificity: Specificity,
    pub rightmost: RightmostKey,
    pub condition: Option<RuleCondition>,
}

/// Every selector of every rule, flattened into one matchable list.
#[derive(Clone, Debug, Default)]
pub struct RuleDB {
    pub entries: Vec<RuleEntry>,
}

impl RuleDB {
    /// Flatten a stylesheet into entries, one per selector of each rule.
    /// Source order continues from `base_order`; the next free order is returned.
    pub fn extend_from_stylesheet(&mut self, sheet: &Stylesheet, origin: Origin, base_order: u32) -> u32 {
        let mut order = base_order;
        for rule in &sheet.rules {
            let Some(list) = parse_selector_list(&rule.prelude) else {
                debug!("skipping rule with unsupported selector `{}`", rule.prelude);
                continue;
            };
            for selector in list.selectors {
                self.entries.push(RuleEntry {
                    origin,
                    source_order: order,
                    specificity: specificity_of_complex(&selector),
                    rightmost: rightmost_key_for(&selector),
                    selector,
                    declarations: rule.declarations.clone(),
                    condition: rule.condition.clone(),
                });
            }
            order = order.saturating_add(1);
        }
        order
    }
}

fn rightmost_key_for(sel: &ComplexSelector) -> RightmostKey {
    let compound = sel.rest.last().map_or(&sel.first, |(_, compound)| compound);
    // Prefer id > class > tag; if none, universal
    for simple in &compound.simples {
        if let SimpleSelector::IdSelector(id) = simple {
            return RightmostKey::Id(id.clone());
        }
    }
    for simple in &compound.simples {
        if let SimpleSelector::Class(class) = simple {
            return RightmostKey::Class(class.clone());
        }
    }
    for simple in &compound.simples {
        if let SimpleSelector::Type(tag) = simple {
            return RightmostKey::Tag(tag.clone());
        }
    }
    RightmostKey::Universal
}
