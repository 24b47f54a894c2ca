//! Page number and page count fields.

use super::{Field, RenderContext};
use crate::error::Result;

/// `{{#PAGE#}}`: number of the current slide, starting at 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageNumberField;

impl Field for PageNumberField {
    fn key(&self) -> &'static str {
        "page"
    }

    fn recognizes(&self, body: &str) -> bool {
        body == "#PAGE#"
    }

    fn render(&self, _body: &str, ctx: &RenderContext) -> Result<String> {
        Ok(ctx.slide_number.to_string())
    }
}

/// `{{#PAGES#}}`: number of slides in the deck.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageCountField;

impl Field for PageCountField {
    fn key(&self) -> &'static str {
        "pages"
    }

    fn recognizes(&self, body: &str) -> bool {
        body == "#PAGES#"
    }

    fn render(&self, _body: &str, ctx: &RenderContext) -> Result<String> {
        Ok(ctx.total_slides.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number() {
        let ctx = RenderContext::new(12, 20);
        assert!(PageNumberField.matches("Page {{ #PAGE# }}"));
        assert_eq!(
            PageNumberField.substitute("{{#PAGE#}}.{{#PAGE#}}", &ctx).unwrap(),
            "12.12"
        );
    }

    #[test]
    fn test_page_count() {
        let ctx = RenderContext::new(1, 20);
        assert!(PageCountField.matches("{{#PAGES#}}"));
        assert!(!PageCountField.matches("{{#PAGE#}}"));
        assert_eq!(
            PageCountField.substitute("1 / {{#PAGES#}}", &ctx).unwrap(),
            "1 / 20"
        );
    }
}
