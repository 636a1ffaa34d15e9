//! CSS selector specificity calculation.
//! Reference: <https://www.w3.org/TR/selectors-3/#specificity>

use crate::{ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector};
use core::ops::Add;

/// Specificity triple (a, b, c).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(
            self.0.saturating_add(rhs.0),
            self.1.saturating_add(rhs.1),
            self.2.saturating_add(rhs.2),
        )
    }
}

fn specificity_of_simple(simple: &SimpleSelector) -> Specificity {
    match simple {
        SimpleSelector::IdSelector(_) => Specificity(1, 0, 0),
        SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => Specificity(0, 1, 0),
        // The negation pseudo-class counts its argument, not itself.
        SimpleSelector::PseudoClass(PseudoClass::Not(inner)) => specificity_of_compound(inner),
        SimpleSelector::PseudoClass(_) => Specificity(0, 1, 0),
        SimpleSelector::Type(_) => Specificity(0, 0, 1),
        SimpleSelector::Universal => Specificity::default(),
    }
}

/// Compute the specificity of a compound selector.
pub fn specificity_of_compound(compound: &CompoundSelector) -> Specificity {
    compound
        .simples
        .iter()
        .map(specificity_of_simple)
        .fold(Specificity::default(), Add::add)
}

/// Compute the specificity of a complex selector (sum of its compounds).
pub fn specificity_of_complex(sel: &ComplexSelector) -> Specificity {
    sel.rest
        .iter()
        .map(|(_, compound)| specificity_of_compound(compound))
        .fold(specificity_of_compound(&sel.first), Add::add)
}
