//! Integration tests for arbor-ui.
//!
//! These tests exercise the public API from outside the crate: bindings,
//! the style cascade, and interpreter-driven layout working together on one
//! declarative tree.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use arbor_ui::geometry::Size;
use arbor_ui::item::{container_of, to_type, CommonItem, Container, FlexChild, TextWidget};
use arbor_ui::style::StyleResolver;
use arbor_ui::{GuiItem, Interpreter, Node, Property, Value};

fn object(entries: Vec<(&str, Value)>) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

#[test]
fn test_binding_reads_never_mutate_and_nearest_ancestor_wins() {
    let root = Node::new("Window");
    let middle = root.append("Panel");
    let leaf = middle.append("Label");
    root.set_attribute("foreground", "#111");
    middle.set_attribute("foreground", "#222");

    let mutations = Rc::new(RefCell::new(0));
    let subscription = {
        let mutations = Rc::clone(&mutations);
        root.subscribe(move |_| *mutations.borrow_mut() += 1)
    };

    let colour = Property::<String>::inheriting_from_ancestors(&leaf, "foreground");
    assert_eq!(colour.resolve(), Some("#222".to_string()));
    assert_eq!(*mutations.borrow(), 0);
    assert!(!leaf.has_attribute("foreground"));
    drop(subscription);
}

#[test]
fn test_binding_callback_fires_for_ancestor_writes() {
    let root = Node::new("Window");
    let leaf = root.append("Panel").append("Label");

    let colour = Property::<String>::inheriting_from_ancestors(&leaf, "foreground");
    let fired = Rc::new(RefCell::new(0));
    {
        let fired = Rc::clone(&fired);
        colour.on_change(move || *fired.borrow_mut() += 1);
    }

    root.set_attribute("foreground", "#abc");
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(colour.resolve(), Some("#abc".to_string()));
}

#[test]
fn test_accumulation_folds_root_first() {
    let root = Node::new("Window");
    let middle = root.append("Panel");
    let leaf = middle.append("Label");
    root.set_attribute("text", "a");
    middle.set_attribute("text", "b");
    leaf.set_attribute("text", "c");

    let text = Property::<String>::accumulating(&leaf, "text");
    assert_eq!(text.resolve(), Some("abc".to_string()));
}

// ---------------------------------------------------------------------------
// Style cascade
// ---------------------------------------------------------------------------

#[test]
fn test_id_refinement_beats_type_refinement() {
    let node = Node::new("Button");
    node.set_attribute("id", "ok");
    node.set_attribute(
        "style",
        object(vec![
            (
                "Button",
                object(vec![("background", Value::String("by-type".into()))]),
            ),
            (
                "#ok",
                object(vec![("background", Value::String("by-id".into()))]),
            ),
        ]),
    );

    let resolver = StyleResolver::new(node);
    assert_eq!(
        resolver.resolve("background"),
        Some(Value::String("by-id".into())),
    );
}

#[test]
fn test_hover_facet_switches_resolution_live() {
    let root = Node::new("Window");
    root.set_attribute(
        "style",
        object(vec![
            ("background", Value::String("base".into())),
            (
                "hover",
                object(vec![("background", Value::String("hot".into()))]),
            ),
        ]),
    );
    let button = root.append("Button");

    let resolver = StyleResolver::new(button.clone());
    assert_eq!(resolver.resolve("background"), Some(Value::String("base".into())));

    button.set_attribute("hover", true);
    assert_eq!(resolver.resolve("background"), Some(Value::String("hot".into())));
}

// ---------------------------------------------------------------------------
// Interpreter-driven layout
// ---------------------------------------------------------------------------

#[test]
fn test_flex_row_distributes_grow_from_markup() {
    let interpreter = Interpreter::new();
    let item = interpreter
        .interpret_str(
            r#"<Component width="300" height="100" flex-direction="row">
                 <Component flex-grow="1"/>
                 <Component flex-grow="2"/>
               </Component>"#,
        )
        .unwrap();

    assert_eq!(item.children()[0].primitive().bounds().width, 100.0);
    assert_eq!(item.children()[1].primitive().bounds().width, 200.0);
    assert_eq!(item.children()[1].primitive().bounds().x, 100.0);
}

#[test]
fn test_border_shorthand_offsets_children() {
    let interpreter = Interpreter::new();
    let item = interpreter
        .interpret_str(
            r#"<Component width="300" height="100" flex-direction="row"
                          border-width="5 10 20 40">
                 <Component width="50"/>
               </Component>"#,
        )
        .unwrap();

    let bounds = item.children()[0].primitive().bounds();
    assert_eq!(bounds.x, 40.0);
    assert_eq!(bounds.y, 5.0);
    // Stretched into the content box: 100 less top 5 and bottom 20.
    assert_eq!(bounds.height, 75.0);
}

#[test]
fn test_grid_template_places_children() {
    let interpreter = Interpreter::new();
    let item = interpreter
        .interpret_str(
            r#"<Component display="grid" width="300" height="100"
                          grid-template-columns="100px 1fr">
                 <Component/>
                 <Component/>
               </Component>"#,
        )
        .unwrap();

    assert_eq!(item.children()[0].primitive().bounds().width, 100.0);
    assert_eq!(item.children()[1].primitive().bounds().x, 100.0);
    assert_eq!(item.children()[1].primitive().bounds().width, 200.0);
}

#[test]
fn test_block_children_sit_at_their_coordinates() {
    let interpreter = Interpreter::new();
    let item = interpreter
        .interpret_str(
            r#"<Component display="block" width="200" height="100">
                 <Component x="30" y="10" width="50" height="20"/>
               </Component>"#,
        )
        .unwrap();

    let bounds = item.children()[0].primitive().bounds();
    assert_eq!(bounds.x, 30.0);
    assert_eq!(bounds.y, 10.0);
    assert_eq!(bounds.width, 50.0);
}

#[test]
fn test_unknown_type_gets_neutral_primitive() {
    let interpreter = Interpreter::new();
    let item = interpreter.interpret(&Node::new("Carousel"));
    assert_eq!(item.primitive().type_tag(), "neutral");
    assert!(!item.primitive().is_interactive());
}

#[test]
fn test_capability_queries_reach_through_the_chain() {
    let interpreter = Interpreter::new();
    let root = interpreter
        .interpret_str(r#"<Component width="300" height="100"><Text text="hi"/></Component>"#)
        .unwrap();

    // Text under a flex parent: base item, common, flex child, widget.
    let text = &root.children()[0];
    assert!(to_type::<TextWidget>(text.as_ref()).is_some());
    assert!(to_type::<FlexChild>(text.as_ref()).is_some());
    assert!(to_type::<CommonItem>(text.as_ref()).is_some());
    assert_eq!(text.primitive().text(), "hi");
}

#[test]
fn test_tree_removal_drops_exactly_one_item() {
    let interpreter = Interpreter::new();
    let root_node = Node::new("Component");
    root_node.set_attribute("width", 300.0);
    root_node.set_attribute("height", 100.0);
    let keep = root_node.append("Button");
    let dropped = root_node.append("Button");

    let item = interpreter.interpret(&root_node);
    assert_eq!(item.child_count(), 2);

    root_node.remove_child(&dropped);
    assert_eq!(item.child_count(), 1);
    assert_eq!(item.children()[0].state(), &keep);
}

#[test]
fn test_dropping_an_interpreted_tree_releases_every_item() {
    let interpreter = Interpreter::new();
    let root_node = Node::new("Component");
    root_node.set_attribute("width", 300.0);
    root_node.set_attribute("height", 100.0);
    root_node.set_attribute("flex-direction", "row");
    let first = root_node.append("Component");
    first.set_attribute("flex-grow", 1.0);
    let second = root_node.append("Component");
    second.set_attribute("flex-grow", 2.0);

    let item = interpreter.interpret(&root_node);
    let weak_item = Rc::downgrade(&item);
    let weak_child = Rc::downgrade(&item.children()[0]);

    // Removing a node tears down its item chain while the tree is live.
    root_node.remove_child(&second);
    assert_eq!(item.child_count(), 1);

    drop(item);
    assert!(weak_item.upgrade().is_none());
    assert!(weak_child.upgrade().is_none());
    // The declarative tree stays usable afterwards.
    first.set_attribute("flex-grow", 3.0);
    assert_eq!(first.attribute_as::<f64>("flex-grow"), Some(3.0));
}

#[test]
fn test_ideal_size_probe_is_deterministic_and_pure() {
    let interpreter = Interpreter::new();
    let root_node = Node::new("Component");
    let first = root_node.append("Component");
    first.set_attribute("width", 80.0);
    first.set_attribute("height", 40.0);
    let second = root_node.append("Component");
    second.set_attribute("width", 50.0);
    second.set_attribute("height", 60.0);

    let item = interpreter.interpret(&root_node);
    let container = container_of(item.as_ref()).unwrap();

    let probe = Size::new(u16::MAX as f32, u16::MAX as f32);
    let first_ideal = container.calculate_ideal_size(probe);
    let second_ideal = container.calculate_ideal_size(probe);
    assert_eq!(first_ideal, Size::new(80.0, 100.0));
    assert_eq!(first_ideal.width.to_bits(), second_ideal.width.to_bits());
    assert_eq!(first_ideal.height.to_bits(), second_ideal.height.to_bits());
    assert!(!first.has_attribute("ideal-width"));
}

#[test]
fn test_alias_expansion_carries_attributes_and_children() {
    let template = Node::new("Component");
    template.set_attribute("padding", 5.0);
    template.append("Text");

    let mut interpreter = Interpreter::new();
    interpreter.add_alias("Card", template);

    let root = Node::new("Component");
    let aliased = root.append("Card");
    aliased.set_attribute("width", 250.0);
    aliased.append("Button");

    let item = interpreter.interpret(&root);
    let card = &item.children()[0];
    assert_eq!(card.state().type_name(), "Component");
    assert_eq!(card.state().attribute_as::<f64>("width"), Some(250.0));
    assert_eq!(card.state().attribute_as::<f64>("padding"), Some(5.0));
    assert_eq!(card.children()[0].state().type_name(), "Text");
    assert_eq!(card.children()[1].state().type_name(), "Button");
}

#[test]
fn test_live_insertion_materializes_new_nodes() {
    let interpreter = Rc::new(Interpreter::new());
    let root_node = Node::new("Component");
    root_node.set_attribute("width", 300.0);
    root_node.set_attribute("height", 100.0);
    root_node.append("Button");

    let item = interpreter.interpret(&root_node);
    let _watch = interpreter.listen_to(&item);
    assert_eq!(item.child_count(), 1);

    let added = root_node.insert(0, "Text");
    added.set_attribute("text", "status");
    assert_eq!(item.child_count(), 2);
    assert_eq!(item.children()[0].primitive().text(), "status");
}
