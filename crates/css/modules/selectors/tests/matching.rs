use css_selectors::{
    ElementAdapter, Specificity, matches_selector_list, parse_selector_list,
    specificity_of_complex,
};

/// Flat element table: (tag, parent index, id, classes, attributes).
struct Tree {
    nodes: Vec<Node>,
}

struct Node {
    tag: &'static str,
    parent: Option<usize>,
    id: Option<&'static str>,
    classes: Vec<&'static str>,
    attrs: Vec<(&'static str, &'static str)>,
}

impl Tree {
    fn siblings(&self, element: usize) -> Vec<usize> {
        let parent = self.nodes[element].parent;
        (0..self.nodes.len())
            .filter(|index| self.nodes[*index].parent == parent)
            .collect()
    }
}

impl ElementAdapter for Tree {
    type Handle = usize;

    fn parent(&self, element: usize) -> Option<usize> {
        self.nodes[element].parent
    }

    fn previous_sibling_element(&self, element: usize) -> Option<usize> {
        self.siblings(element)
            .into_iter()
            .take_while(|index| *index != element)
            .last()
    }

    fn next_sibling_element(&self, element: usize) -> Option<usize> {
        self.siblings(element)
            .into_iter()
            .skip_while(|index| *index != element)
            .nth(1)
    }

    fn tag_name(&self, element: usize) -> &str {
        self.nodes[element].tag
    }

    fn element_id(&self, element: usize) -> Option<&str> {
        self.nodes[element].id
    }

    fn has_class(&self, element: usize, class: &str) -> bool {
        self.nodes[element].classes.contains(&class)
    }

    fn attr(&self, element: usize, name: &str) -> Option<&str> {
        self.nodes[element]
            .attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    fn is_empty(&self, element: usize) -> bool {
        !self.nodes.iter().any(|node| node.parent == Some(element))
    }
}

fn node(tag: &'static str, parent: Option<usize>) -> Node {
    Node {
        tag,
        parent,
        id: None,
        classes: Vec::new(),
        attrs: Vec::new(),
    }
}

/// html > body > (header > nav > a.link[href], main#content > (p.Intro, p, button.cta.primary[data-kind=buy]))
fn sample() -> Tree {
    let mut nodes = vec![
        node("html", None),
        node("body", Some(0)),
        node("header", Some(1)),
        node("nav", Some(2)),
        node("a", Some(3)),
        node("main", Some(1)),
        node("p", Some(5)),
        node("p", Some(5)),
        node("button", Some(5)),
    ];
    nodes[4].classes = vec!["link"];
    nodes[4].attrs = vec![("href", "/home")];
    nodes[5].id = Some("content");
    nodes[6].classes = vec!["Intro"];
    nodes[8].classes = vec!["cta", "primary"];
    nodes[8].attrs = vec![
        ("class", "cta primary"),
        ("data-kind", "buy-now"),
        ("lang", "en-US"),
    ];
    Tree { nodes }
}

fn matches(tree: &Tree, element: usize, selector: &str) -> bool {
    let Some(list) = parse_selector_list(selector) else {
        panic!("{selector} should parse");
    };
    matches_selector_list(tree, element, &list)
}

#[test]
fn descendant_matching_backtracks_through_ancestors() {
    let tree = sample();
    assert!(matches(&tree, 4, "header a"));
    assert!(matches(&tree, 4, "body > header nav > a"));
    assert!(matches(&tree, 4, "html header > nav a.link"));
    assert!(!matches(&tree, 4, "main a"));
    assert!(!matches(&tree, 4, "body > nav a"));
}

#[test]
fn sibling_combinators() {
    let tree = sample();
    assert!(matches(&tree, 7, "p.Intro + p"));
    assert!(matches(&tree, 8, "p.Intro ~ button"));
    assert!(!matches(&tree, 8, "p.Intro + button"));
}

#[test]
fn class_matching_is_case_sensitive() {
    let tree = sample();
    assert!(matches(&tree, 6, ".Intro"));
    assert!(!matches(&tree, 6, ".intro"));
    assert!(matches(&tree, 6, "P.Intro"));
}

#[test]
fn attribute_operators() {
    let tree = sample();
    assert!(matches(&tree, 8, "[data-kind]"));
    assert!(matches(&tree, 8, "[data-kind^=buy]"));
    assert!(matches(&tree, 8, "[data-kind$='now']"));
    assert!(matches(&tree, 8, "[data-kind*=\"y-n\"]"));
    assert!(matches(&tree, 8, "[lang|=en]"));
    assert!(matches(&tree, 8, "[class~=primary]"));
    assert!(matches(&tree, 8, "[data-kind=BUY-NOW i]"));
    assert!(!matches(&tree, 8, "[data-kind=buy]"));
}

#[test]
fn structural_pseudo_classes() {
    let tree = sample();
    assert!(matches(&tree, 0, ":root"));
    assert!(!matches(&tree, 1, ":root"));
    assert!(matches(&tree, 6, "p:first-child"));
    assert!(matches(&tree, 8, "button:last-child"));
    assert!(matches(&tree, 4, "a:only-child:link"));
    assert!(matches(&tree, 8, ":empty"));
    assert!(matches(&tree, 7, "p:not(.Intro)"));
    assert!(!matches(&tree, 8, "button:hover"));
}

#[test]
fn specificity_counts() {
    let Some(list) = parse_selector_list("main#content > p.Intro:first-child, *") else {
        panic!("list should parse");
    };
    assert_eq!(specificity_of_complex(&list.selectors[0]), Specificity(1, 2, 2));
    assert_eq!(specificity_of_complex(&list.selectors[1]), Specificity(0, 0, 0));
}
