//! Editing of inline `style` attributes (`key:value;key:value`).

/// Look up a property in an inline style string.
pub fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(key, _)| key.trim() == property)
        .map(|(_, value)| value.trim())
}

/// Set a property in an inline style string, leaving every other
/// declaration untouched.
///
/// Existing declarations of the property are rewritten in place; otherwise
/// the declaration is prepended.
pub fn set_style_property(style: &str, property: &str, value: &str) -> String {
    let mut found = false;
    let declarations: Vec<String> = style
        .split(';')
        .map(|decl| match decl.split_once(':') {
            Some((key, _)) if key.trim() == property => {
                found = true;
                format!("{}:{}", property, value)
            }
            _ => decl.to_string(),
        })
        .collect();

    if found {
        declarations.join(";")
    } else if style.trim().is_empty() {
        format!("{}:{}", property, value)
    } else {
        format!("{}:{};{}", property, value, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_property_lookup() {
        let style = "fill:#fff; display: inline ;opacity:0.5";
        assert_eq!(style_property(style, "display"), Some("inline"));
        assert_eq!(style_property(style, "opacity"), Some("0.5"));
        assert_eq!(style_property(style, "stroke"), None);
        assert_eq!(style_property("", "display"), None);
    }

    #[test]
    fn test_set_existing_property() {
        assert_eq!(
            set_style_property("fill:red;display: inline", "display", "none"),
            "fill:red;display:none"
        );
    }

    #[test]
    fn test_set_missing_property_prepends() {
        assert_eq!(
            set_style_property("fill:red", "display", "none"),
            "display:none;fill:red"
        );
        assert_eq!(set_style_property("", "display", "none"), "display:none");
    }

    #[test]
    fn test_similar_names_are_not_touched() {
        assert_eq!(
            set_style_property("fill-opacity:1", "opacity", "0.5"),
            "opacity:0.5;fill-opacity:1"
        );
    }
}
