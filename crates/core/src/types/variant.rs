//! Product variants (size / color combinations).

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A specific size/color combination of a product.
///
/// Either component may be absent for products that do not come in sizes or
/// colors. Values are trimmed; empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    pub size: Option<String>,
    pub color: Option<String>,
}

impl Variant {
    /// Create a variant, normalising blank components to `None`.
    #[must_use]
    pub fn new(size: Option<&str>, color: Option<&str>) -> Self {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Self {
            size: clean(size),
            color: clean(color),
        }
    }

    /// Composite cart key for this variant of `product_id`.
    ///
    /// Components are joined with `-`. A `-` or `\` inside a size or color
    /// is escaped with a backslash, so distinct variants never share a key.
    ///
    /// ```
    /// use boutique_core::{ProductId, Variant};
    ///
    /// let v = Variant::new(Some("M"), Some("Black"));
    /// assert_eq!(v.unique_id(ProductId::new(3)), "3-M-Black");
    /// assert_eq!(Variant::default().unique_id(ProductId::new(3)), "3--");
    /// assert_eq!(
    ///     Variant::new(Some("X-L"), None).unique_id(ProductId::new(3)),
    ///     r"3-X\-L-"
    /// );
    /// ```
    #[must_use]
    pub fn unique_id(&self, product_id: ProductId) -> String {
        format!(
            "{product_id}-{}-{}",
            escape_component(self.size.as_deref()),
            escape_component(self.color.as_deref())
        )
    }

    /// Short label such as "M / Black", or `None` for the default variant.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => Some(format!("{size} / {color}")),
            (Some(one), None) | (None, Some(one)) => Some(one.clone()),
            (None, None) => None,
        }
    }
}

fn escape_component(value: Option<&str>) -> String {
    let value = value.unwrap_or_default();
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '-' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_components_are_absent() {
        let v = Variant::new(Some("  "), Some(" Red "));
        assert_eq!(v.size, None);
        assert_eq!(v.color.as_deref(), Some("Red"));
        assert_eq!(v.label().as_deref(), Some("Red"));
    }

    #[test]
    fn test_distinct_variants_have_distinct_keys() {
        let id = ProductId::new(1);
        let a = Variant::new(Some("S"), Some("Red")).unique_id(id);
        let b = Variant::new(Some("M"), Some("Red")).unique_id(id);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hyphenated_options_do_not_collide() {
        let id = ProductId::new(1);
        let a = Variant::new(Some("X-L"), Some("Navy")).unique_id(id);
        let b = Variant::new(Some("X"), Some("L-Navy")).unique_id(id);
        assert_ne!(a, b);
        assert_eq!(a, r"1-X\-L-Navy");
        assert_eq!(b, r"1-X-L\-Navy");
    }

    #[test]
    fn test_backslashes_are_escaped() {
        let id = ProductId::new(1);
        let a = Variant::new(Some("A\\"), Some("-B")).unique_id(id);
        let b = Variant::new(Some("A\\-"), Some("B")).unique_id(id);
        assert_ne!(a, b);
    }
}
