    use super::*;

    #[test]
    fn test_new_document_skeleton() {
        let doc = Document::new("Title", "https://example.com/");
        assert_eq!(doc.tag(doc.head()), Some("head"));
        assert_eq!(doc.tag(doc.body()), Some("body"));
        assert!(doc.is_attached(doc.body()));
        assert_eq!(doc.elements().len(), 3);
    }

    #[test]
    fn test_append_and_reparent() {
        let mut doc = Document::new("", "");
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let body = doc.body();
        doc.append_child(body, a).unwrap();
        doc.append_child(body, b).unwrap();
        let span = doc.create_element("span");
        doc.append_child(a, span).unwrap();
        doc.append_child(b, span).unwrap();

        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[span]);
        assert_eq!(doc.parent(span), Some(b));
    }

    #[test]
    fn test_append_into_own_subtree_rejected() {
        let mut doc = Document::new("", "");
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert!(doc.append_child(inner, outer).is_err());
    }

    #[test]
    fn test_text_node_cannot_have_children() {
        let mut doc = Document::new("", "");
        let text = doc.create_text("x");
        let el = doc.create_element("b");
        assert!(matches!(doc.append_child(text, el), Err(DomError::NotAnElement(_))));
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let mut doc = Document::new("", "");
        let body = doc.body();
        let first = doc.create_text("1");
        let second = doc.create_text("2");
        let third = doc.create_text("3");
        for n in [first, second, third] {
            doc.append_child(body, n).unwrap();
        }
        let replacement = doc.create_element("em");
        doc.replace_child(second, replacement).unwrap();

        assert_eq!(doc.children(body), &[first, replacement, third]);
        assert!(!doc.is_attached(second));
        assert!(doc.replace_child(second, first).is_err());
    }

    #[test]
    fn test_remove_detached_fails() {
        let mut doc = Document::new("", "");
        let el = doc.create_element("p");
        assert!(matches!(doc.remove(el), Err(DomError::Detached(_))));
        assert!(matches!(doc.remove(1234), Err(DomError::NoSuchNode(1234))));
    }

    #[test]
    fn test_attributes_and_style() {
        let mut doc = Document::new("", "");
        let el = doc.create_element("DIV");
        assert_eq!(doc.tag(el), Some("div"));

        doc.set_attribute(el, "Data-X", "1").unwrap();
        assert_eq!(doc.get_attribute(el, "data-x").as_deref(), Some("1"));

        doc.set_attribute(el, "style", "color: red; padding: 2px").unwrap();
        assert_eq!(doc.style(el, "padding").as_deref(), Some("2px"));
        doc.set_style(el, "color", "").unwrap();
        assert_eq!(doc.get_attribute(el, "style").as_deref(), Some("padding: 2px;"));
        assert!(doc.remove_attribute(el, "style").unwrap());
        assert_eq!(doc.get_attribute(el, "style"), None);
    }

    #[test]
    fn test_class_manipulation() {
        let mut doc = Document::new("", "");
        let body = doc.body();
        doc.add_class(body, "a").unwrap();
        doc.add_class(body, "plugin-dark-theme").unwrap();
        doc.add_class(body, "a").unwrap();
        assert_eq!(doc.get_attribute(body, "class").as_deref(), Some("a plugin-dark-theme"));

        doc.toggle_class(body, "plugin-dark-theme", false).unwrap();
        assert!(!doc.element(body).unwrap().has_class("plugin-dark-theme"));
        assert!(doc.element(body).unwrap().has_class("a"));
    }

    #[test]
    fn test_form_values() {
        let mut doc = Document::new("", "");
        let input = doc.create_element("input");
        doc.set_attribute(input, "value", "initial").unwrap();
        assert_eq!(doc.value(input).unwrap(), "initial");
        doc.set_value(input, "typed").unwrap();
        assert_eq!(doc.value(input).unwrap(), "typed");
        assert_eq!(doc.get_attribute(input, "value").as_deref(), Some("initial"));

        let textarea = doc.create_element("textarea");
        let text = doc.create_text("body text");
        doc.append_child(textarea, text).unwrap();
        assert_eq!(doc.value(textarea).unwrap(), "body text");

        let div = doc.create_element("div");
        assert!(matches!(
            doc.set_value(div, "x"),
            Err(DomError::NotAFormControl { .. })
        ));
    }

    #[test]
    fn test_select_value() {
        let mut doc = Document::from_fixture_str(
            r#"{"body": [{"tag": "select", "children": [
                {"tag": "option", "attrs": {"value": "a"}, "text": "A"},
                {"tag": "option", "attrs": {"value": "b", "selected": ""}, "text": "B"}
            ]}]}"#,
        )
        .unwrap();
        let select = doc.query_selector("select").unwrap().unwrap();
        assert_eq!(doc.value(select).unwrap(), "b");
        doc.set_value(select, "a").unwrap();
        assert_eq!(doc.value(select).unwrap(), "a");
    }

    #[test]
    fn test_normalize_merges_and_drops_empty() {
        let mut doc = Document::new("", "");
        let p = doc.create_element("p");
        for t in ["a", "", "b"] {
            let n = doc.create_text(t);
            doc.append_child(p, n).unwrap();
        }
        let b = doc.create_element("b");
        doc.append_child(p, b).unwrap();
        let c = doc.create_text("c");
        doc.append_child(p, c).unwrap();

        doc.normalize(p).unwrap();
        assert_eq!(doc.children(p).len(), 3);
        assert_eq!(doc.text(doc.children(p)[0]), Some("ab"));
    }

    #[test]
    fn test_inner_text_skips_scripts() {
        let doc = Document::from_fixture_str(
            r#"{"body": [
                {"tag": "p", "text": "  Hello  "},
                {"tag": "script", "text": "alert(1)"},
                {"tag": "noscript", "text": "enable js"},
                {"tag": "p", "text": "World"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.inner_text(doc.body()), "Hello\nWorld");
    }

    #[test]
    fn test_closest_and_previous_sibling() {
        let doc = Document::from_fixture_str(
            r#"{"body": [{"tag": "label", "children": [
                "Name",
                {"tag": "span"},
                {"tag": "input", "attrs": {"id": "n"}}
            ]}]}"#,
        )
        .unwrap();
        let input = doc.get_element_by_id("n").unwrap();
        let label = doc.closest(input, "label").unwrap();
        assert_eq!(doc.tag(label), Some("label"));
        let prev = doc.previous_element_sibling(input).unwrap();
        assert_eq!(doc.tag(prev), Some("span"));
        assert!(doc.closest(input, "form").is_none());
    }

    #[test]
    fn test_scroll_into_view_requires_attachment() {
        let mut doc = Document::new("", "");
        let orphan = doc.create_element("div");
        assert!(matches!(doc.scroll_into_view(orphan), Err(DomError::Detached(_))));
    }
